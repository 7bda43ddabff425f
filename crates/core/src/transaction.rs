use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::amount::Amount;

/// Longest description kept on a transaction, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Expense => write!(f, "expense"),
            TransactionType::Income => write!(f, "income"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(format!("Unknown transaction type: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    MobileMoney,
    Other(String),
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::MobileMoney => write!(f, "mobile_money"),
            PaymentMethod::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "" => Err("Empty payment method".to_string()),
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "visa" | "mastercard" | "debit_card" | "credit_card" => Ok(PaymentMethod::Card),
            "bank_transfer" | "bank" | "transfer" | "eft" => Ok(PaymentMethod::BankTransfer),
            "mobile_money" | "momo" => Ok(PaymentMethod::MobileMoney),
            _ => Ok(PaymentMethod::Other(s.trim().to_string())),
        }
    }
}

/// One extracted transaction.
///
/// Created by an extractor or the statement table parser and not mutated
/// afterwards; the `with_*` builders consume and return `self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    pub amount: Amount,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    /// Extraction reliability, 0–100. Used for ranking only.
    pub confidence: u8,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub raw_text: String,
    pub payment_method: Option<PaymentMethod>,
}

impl ParsedTransaction {
    pub fn new(
        amount: Amount,
        description: &str,
        date: NaiveDate,
        tx_type: TransactionType,
        raw_text: &str,
    ) -> Self {
        ParsedTransaction {
            amount,
            description: truncate_description(description),
            category: "Other".to_string(),
            date,
            merchant: None,
            confidence: 0,
            tx_type,
            raw_text: raw_text.to_string(),
            payment_method: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_merchant(mut self, merchant: Option<String>) -> Self {
        self.merchant = merchant.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(100);
        self
    }

    pub fn with_payment_method(mut self, method: Option<PaymentMethod>) -> Self {
        self.payment_method = method;
        self
    }

    pub fn is_expense(&self) -> bool {
        self.tx_type == TransactionType::Expense
    }

    /// Canonical `YYYY-MM-DD` rendering of the transaction date.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

fn truncate_description(description: &str) -> String {
    let trimmed = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.chars().count() <= MAX_DESCRIPTION_CHARS {
        trimmed
    } else {
        trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect::<String>().trim_end().to_string()
    }
}
