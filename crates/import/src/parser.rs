use chrono::NaiveDate;
use txscan_core::{CategoryTaxonomy, MultiParseResult, ParsedTransaction, SourceType};

use crate::arbiter::arbitrate;
use crate::category::CategoryClassifier;
use crate::date::DateParser;
use crate::extractors::{ExtractContext, ExtractorRegistry, ProviderProfile};
use crate::source_type::classify_source;

/// Rule-based text parser: source classification, extraction, arbitration.
#[derive(Debug, Clone, Default)]
pub struct TextParser {
    categories: CategoryClassifier,
    registry: ExtractorRegistry,
    dates: DateParser,
}

impl TextParser {
    pub fn new(taxonomy: CategoryTaxonomy, providers: Vec<ProviderProfile>) -> Self {
        Self {
            categories: CategoryClassifier::new(taxonomy),
            registry: ExtractorRegistry::new(providers),
            dates: DateParser::local(),
        }
    }

    /// Pin "today" for relative dates and undated input.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.dates = DateParser::new(today);
        self
    }

    pub fn categories(&self) -> &CategoryClassifier {
        &self.categories
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn classify(&self, text: &str) -> SourceType {
        classify_source(text, &self.registry)
    }

    pub fn parse_multi(&self, text: &str) -> MultiParseResult {
        let source_type = self.classify(text);
        if source_type == SourceType::Unknown {
            return MultiParseResult::empty(text);
        }
        let ctx = ExtractContext { dates: &self.dates, categories: &self.categories };

        if source_type != SourceType::Single {
            let hit = self
                .registry
                .for_source(source_type)
                .map(|extractor| (extractor, extractor.extract(text, &ctx)))
                .find(|(_, items)| !items.is_empty());
            if let Some((extractor, items)) = hit {
                tracing::debug!(extractor = %extractor.name(), items = items.len(), "text parsed");
                return MultiParseResult::from_items(self.validated(items), source_type, text);
            }
            tracing::debug!(%source_type, "no extractor produced output, pooling all");
        }

        let pool: Vec<ParsedTransaction> = self
            .registry
            .iter()
            .flat_map(|extractor| extractor.extract(text, &ctx))
            .collect();
        let items = arbitrate(pool);
        if items.is_empty() {
            tracing::debug!("no candidates");
            return MultiParseResult::empty(text);
        }
        tracing::debug!(items = items.len(), "text parsed in single mode");
        MultiParseResult::from_items(self.validated(items), SourceType::Single, text)
    }

    /// The best transaction, if any.
    pub fn parse_single(&self, text: &str) -> Option<ParsedTransaction> {
        self.parse_multi(text).best().cloned()
    }

    fn validated(&self, items: Vec<ParsedTransaction>) -> Vec<ParsedTransaction> {
        items
            .into_iter()
            .map(|tx| {
                let category = self.categories.validate_category(&tx.category, tx.tx_type);
                tx.with_category(category)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use txscan_core::{KeywordRule, TransactionType};

    fn parser() -> TextParser {
        TextParser::default().with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn expense_list_totals() {
        let result = parser().parse_multi("Food 60k, Fuel 40k");
        assert_eq!(result.source_type, SourceType::ListStyle);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].amount.value(), Decimal::from(60_000));
        assert_eq!(result.items[1].amount.value(), Decimal::from(40_000));
        assert_eq!(result.total_amount, Decimal::from(100_000));
        assert_eq!(result.confidence, 75);
    }

    #[test]
    fn bare_total_yields_one_aggregate() {
        let result = parser().parse_multi("Total: 2,500.00");
        assert_eq!(result.source_type, SourceType::Single);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].amount.value(), Decimal::from(2_500));
    }

    #[test]
    fn empty_text_is_unknown() {
        let result = parser().parse_multi("   ");
        assert_eq!(result.source_type, SourceType::Unknown);
        assert!(result.is_empty());
        assert_eq!(result.total_amount, Decimal::ZERO);
        assert_eq!(result.confidence, 0);
    }

    #[test]
    fn nothing_extractable_is_unknown() {
        let result = parser().parse_multi("hello there, how are you");
        assert!(result.is_empty());
        assert_eq!(result.source_type, SourceType::Unknown);
    }

    #[test]
    fn named_receipt_dispatch() {
        let result = parser().parse_multi("MTN MoMo: You have paid UGX 15,000 to JAVA HOUSE on 12/03/2024.");
        assert_eq!(result.source_type, SourceType::NamedReceipt);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].merchant.as_deref(), Some("JAVA HOUSE"));
    }

    #[test]
    fn bank_sms_dispatch() {
        let tx = parser()
            .parse_single("Your A/C XX1234 has been debited with UGX 45,000.00 at SHELL KIRA RD")
            .unwrap();
        assert_eq!(tx.amount.value(), Decimal::from(45_000));
        assert_eq!(tx.category, "Fuel");
    }

    #[test]
    fn itemized_receipt_dispatch() {
        let text = "SHOPRITE LUGOGO\nCash Receipt\nSugar 2kg          7,500\nBread .......... 4,500\nTOTAL              12,000";
        let result = parser().parse_multi(text);
        assert_eq!(result.source_type, SourceType::ItemizedReceipt);
        let got: Vec<_> = result.items.iter().map(|t| (t.description.as_str(), t.amount.value())).collect();
        assert_eq!(got, vec![("Sugar 2kg", Decimal::from(7_500)), ("Bread", Decimal::from(4_500))]);
        assert_eq!(result.total_amount, Decimal::from(12_000));
    }

    #[test]
    fn empty_dispatch_falls_through_to_unknown() {
        let p = parser();
        assert_eq!(p.classify("Money sent from account"), SourceType::BankSms);
        let result = p.parse_multi("Money sent from account");
        assert!(result.is_empty());
        assert_eq!(result.source_type, SourceType::Unknown);
        assert_eq!(result.confidence, 0);
        assert!(p.parse_single("Money sent from account").is_none());
    }

    #[test]
    fn single_mode_prefers_the_strongest_candidate() {
        let tx = parser().parse_single("I spent 12k on lunch yesterday").unwrap();
        assert_eq!(tx.amount.value(), Decimal::from(12_000));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
    }

    #[test]
    fn categories_are_always_taxonomy_members() {
        let taxonomy = CategoryTaxonomy {
            expense: vec!["Coffee".to_string(), "Other".to_string()],
            expense_keywords: vec![KeywordRule::new("Coffee", &["latte"])],
            ..CategoryTaxonomy::default()
        };
        let p = TextParser::new(taxonomy, ProviderProfile::defaults());
        let result = p.parse_multi("latte 8k, fuel 40k");
        let cats: Vec<_> = result.items.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(cats, vec!["Coffee", "Other"]);
        assert!(result.items.iter().all(|t| t.tx_type == TransactionType::Expense));
    }
}
