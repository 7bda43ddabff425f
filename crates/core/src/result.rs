use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::transaction::ParsedTransaction;

/// Closed classification of an input text blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    ListStyle,
    NamedReceipt,
    BankSms,
    ItemizedReceipt,
    Single,
    Unknown,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::ListStyle => write!(f, "list-style"),
            SourceType::NamedReceipt => write!(f, "named-receipt"),
            SourceType::BankSms => write!(f, "bank-sms"),
            SourceType::ItemizedReceipt => write!(f, "itemized-receipt"),
            SourceType::Single => write!(f, "single"),
            SourceType::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for SourceType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list-style" => Ok(SourceType::ListStyle),
            "named-receipt" => Ok(SourceType::NamedReceipt),
            "bank-sms" => Ok(SourceType::BankSms),
            "itemized-receipt" => Ok(SourceType::ItemizedReceipt),
            "single" => Ok(SourceType::Single),
            "unknown" => Ok(SourceType::Unknown),
            other => Err(format!("Unknown source type: '{other}'")),
        }
    }
}

/// Output of the text path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiParseResult {
    pub items: Vec<ParsedTransaction>,
    /// Sum of the expense items only.
    pub total_amount: Decimal,
    pub source_type: SourceType,
    /// Rounded mean of the item confidences (0 when there are no items).
    pub confidence: u8,
    pub raw_text: String,
}

impl MultiParseResult {
    pub fn from_items(items: Vec<ParsedTransaction>, source_type: SourceType, raw_text: &str) -> Self {
        let total_amount = items
            .iter()
            .filter(|tx| tx.is_expense())
            .map(|tx| tx.amount.value())
            .fold(Decimal::ZERO, |a, b| a + b);

        let confidence = if items.is_empty() {
            0
        } else {
            let sum: u32 = items.iter().map(|tx| u32::from(tx.confidence)).sum();
            let n = items.len() as u32;
            ((sum + n / 2) / n).min(100) as u8
        };

        MultiParseResult {
            items,
            total_amount,
            source_type,
            confidence,
            raw_text: raw_text.to_string(),
        }
    }

    pub fn empty(raw_text: &str) -> Self {
        Self::from_items(Vec::new(), SourceType::Unknown, raw_text)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The highest-confidence item, first one on ties.
    pub fn best(&self) -> Option<&ParsedTransaction> {
        self.items.iter().fold(None, |best: Option<&ParsedTransaction>, tx| match best {
            Some(b) if b.confidence >= tx.confidence => Some(b),
            _ => Some(tx),
        })
    }
}

/// Per-document counters for rows the statement parser passed over.
/// Diagnostic only; correctness never depends on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDiagnostics {
    pub pages_read: usize,
    pub rows_seen: usize,
    pub rows_without_date: usize,
    pub rows_without_amount: usize,
    pub rows_blocklisted: usize,
    pub duplicates_removed: usize,
}

/// Output of the PDF path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStatementResult {
    /// Most recent first.
    pub transactions: Vec<ParsedTransaction>,
    pub bank_name: Option<String>,
    /// Trailing digits of the detected account number.
    pub account_number: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub diagnostics: StatementDiagnostics,
}

impl BankStatementResult {
    pub fn ok(
        transactions: Vec<ParsedTransaction>,
        bank_name: Option<String>,
        account_number: Option<String>,
        diagnostics: StatementDiagnostics,
    ) -> Self {
        BankStatementResult {
            transactions,
            bank_name,
            account_number,
            success: true,
            error: None,
            diagnostics,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        BankStatementResult {
            transactions: Vec::new(),
            bank_name: None,
            account_number: None,
            success: false,
            error: Some(message.into()),
            diagnostics: StatementDiagnostics::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::transaction::TransactionType;
    use chrono::NaiveDate;

    fn tx(units: i64, tx_type: TransactionType, confidence: u8) -> ParsedTransaction {
        ParsedTransaction::new(
            Amount::new(Decimal::from(units)).unwrap(),
            "item",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            tx_type,
            "",
        )
        .with_confidence(confidence)
    }

    #[test]
    fn total_counts_expenses_only() {
        let result = MultiParseResult::from_items(
            vec![
                tx(60_000, TransactionType::Expense, 75),
                tx(40_000, TransactionType::Expense, 75),
                tx(1_000_000, TransactionType::Income, 80),
            ],
            SourceType::ListStyle,
            "",
        );
        assert_eq!(result.total_amount, Decimal::from(100_000));
    }

    #[test]
    fn confidence_is_rounded_mean() {
        let result = MultiParseResult::from_items(
            vec![tx(1, TransactionType::Expense, 80), tx(1, TransactionType::Expense, 75)],
            SourceType::Single,
            "",
        );
        assert_eq!(result.confidence, 78);
    }

    #[test]
    fn empty_result_is_unknown() {
        let result = MultiParseResult::empty("nothing here");
        assert_eq!(result.source_type, SourceType::Unknown);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.total_amount, Decimal::ZERO);
    }

    #[test]
    fn best_prefers_first_on_tie() {
        let result = MultiParseResult::from_items(
            vec![tx(1, TransactionType::Expense, 80), tx(2, TransactionType::Expense, 80)],
            SourceType::Single,
            "",
        );
        assert_eq!(result.best().unwrap().amount.value(), Decimal::from(1));
    }

    #[test]
    fn source_type_roundtrip() {
        for st in [
            SourceType::ListStyle,
            SourceType::NamedReceipt,
            SourceType::BankSms,
            SourceType::ItemizedReceipt,
            SourceType::Single,
            SourceType::Unknown,
        ] {
            assert_eq!(st.to_string().parse::<SourceType>().unwrap(), st);
            assert_eq!(serde_json::to_value(st).unwrap(), st.to_string());
        }
    }

    #[test]
    fn failed_statement_result_carries_message() {
        let r = BankStatementResult::failed("Document is password protected");
        assert!(!r.success);
        assert!(r.transactions.is_empty());
        assert_eq!(r.error.as_deref(), Some("Document is password protected"));
    }
}
