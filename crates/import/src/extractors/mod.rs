//! Format-specific transaction extractors.
//!
//! Dispatch goes through the closed [`Extractor`] enum; the registry keeps the
//! variants in a fixed priority order so a new provider format is one more
//! entry, not another branch.

pub mod bank_sms;
pub mod generic;
pub mod itemized;
pub mod list;
pub mod named_receipt;

use txscan_core::{Amount, ParsedTransaction, SourceType, TransactionType};

use crate::category::CategoryClassifier;
use crate::date::DateParser;

pub use named_receipt::ProviderProfile;

pub const LIST_CONFIDENCE: u8 = 75;
pub const NAMED_RECEIPT_CONFIDENCE: u8 = 85;
pub const BANK_SMS_CONFIDENCE: u8 = 80;
pub const ITEMIZED_LINE_CONFIDENCE: u8 = 80;
pub const ITEMIZED_TOTAL_CONFIDENCE: u8 = 70;
pub const GENERIC_CONFIDENCE: u8 = 60;

/// Shared parsers handed to every extractor.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub dates: &'a DateParser,
    pub categories: &'a CategoryClassifier,
}

impl ExtractContext<'_> {
    /// Build a transaction whose category comes from `category_text`.
    pub fn transaction(
        &self,
        amount: Amount,
        description: &str,
        category_text: &str,
        tx_type: TransactionType,
        raw_text: &str,
        confidence: u8,
    ) -> ParsedTransaction {
        let category = self.categories.classify(category_text, tx_type).category;
        ParsedTransaction::new(amount, description, self.dates.parse(raw_text), tx_type, raw_text)
            .with_category(category)
            .with_confidence(confidence)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extractor {
    NamedReceipt(ProviderProfile),
    BankSms,
    ItemizedReceipt,
    ListStyle,
    /// Whole-text fallback, only pooled in `single` mode.
    Generic,
}

impl Extractor {
    pub fn name(&self) -> String {
        match self {
            Extractor::NamedReceipt(p) => format!("named-receipt:{}", p.name),
            Extractor::BankSms => "bank-sms".to_string(),
            Extractor::ItemizedReceipt => "itemized-receipt".to_string(),
            Extractor::ListStyle => "list-style".to_string(),
            Extractor::Generic => "generic".to_string(),
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            Extractor::NamedReceipt(_) => SourceType::NamedReceipt,
            Extractor::BankSms => SourceType::BankSms,
            Extractor::ItemizedReceipt => SourceType::ItemizedReceipt,
            Extractor::ListStyle => SourceType::ListStyle,
            Extractor::Generic => SourceType::Single,
        }
    }

    /// Whether the text carries what this extractor needs to run at all.
    pub fn applies(&self, text: &str) -> bool {
        match self {
            Extractor::NamedReceipt(p) => p.matches(text),
            Extractor::BankSms => bank_sms::applies(text),
            Extractor::ItemizedReceipt => itemized::applies(text),
            Extractor::ListStyle => list::applies(text),
            Extractor::Generic => !text.trim().is_empty(),
        }
    }

    /// Zero, one or many candidates. Never fails; an inapplicable extractor
    /// simply returns nothing.
    pub fn extract(&self, text: &str, ctx: &ExtractContext<'_>) -> Vec<ParsedTransaction> {
        if !self.applies(text) {
            return Vec::new();
        }
        match self {
            Extractor::NamedReceipt(p) => named_receipt::extract(p, text, ctx).into_iter().collect(),
            Extractor::BankSms => bank_sms::extract(text, ctx).into_iter().collect(),
            Extractor::ItemizedReceipt => itemized::extract(text, ctx),
            Extractor::ListStyle => list::extract(text, ctx),
            Extractor::Generic => generic::extract(text, ctx).into_iter().collect(),
        }
    }
}

/// All extractors in priority order: named receipts (provider order), bank
/// SMS, itemized receipts, lists, generic.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<Extractor>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new(ProviderProfile::defaults())
    }
}

impl ExtractorRegistry {
    pub fn new(providers: Vec<ProviderProfile>) -> Self {
        let mut extractors: Vec<Extractor> = providers.into_iter().map(Extractor::NamedReceipt).collect();
        extractors.extend([
            Extractor::BankSms,
            Extractor::ItemizedReceipt,
            Extractor::ListStyle,
            Extractor::Generic,
        ]);
        Self { extractors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extractor> {
        self.extractors.iter()
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderProfile> {
        self.extractors.iter().filter_map(|e| match e {
            Extractor::NamedReceipt(p) => Some(p),
            _ => None,
        })
    }

    /// Extractors serving one source type, in priority order.
    pub fn for_source(&self, source_type: SourceType) -> impl Iterator<Item = &Extractor> {
        self.extractors.iter().filter(move |e| e.source_type() == source_type)
    }
}
