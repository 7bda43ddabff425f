use txscan_core::SourceType;

use crate::extractors::itemized::RETAIL_KEYWORDS;
use crate::extractors::{bank_sms, list, ExtractorRegistry};
use crate::util::{contains_any, contains_word, normalize};

/// Decide which extractor family a text blob belongs to. First match wins.
pub fn classify_source(text: &str, registry: &ExtractorRegistry) -> SourceType {
    if text.trim().is_empty() {
        return SourceType::Unknown;
    }
    if registry.providers().any(|p| p.matches(text)) {
        return SourceType::NamedReceipt;
    }
    let lower = normalize(text);
    if contains_any(&lower, RETAIL_KEYWORDS) && contains_word(&lower, "receipt") && lower.contains("total") {
        return SourceType::ItemizedReceipt;
    }
    if bank_sms::applies(text) {
        return SourceType::BankSms;
    }
    if list::numeric_segments(text) >= 2 {
        return SourceType::ListStyle;
    }
    SourceType::Single
}
