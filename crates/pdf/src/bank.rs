use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::PdfError;

/// One configurable bank signature: a regex over the lower-cased document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankPattern {
    pub pattern: String,
    pub name: String,
}

impl BankPattern {
    pub fn new(pattern: &str, name: &str) -> Self {
        Self { pattern: pattern.to_string(), name: name.to_string() }
    }
}

pub fn default_bank_patterns() -> Vec<BankPattern> {
    vec![
        BankPattern::new(r"stanbic", "Stanbic Bank"),
        BankPattern::new(r"centenary|centebank", "Centenary Bank"),
        BankPattern::new(r"\bdfcu\b", "dfcu Bank"),
        BankPattern::new(r"\babsa\b|barclays", "Absa Bank"),
        BankPattern::new(r"equity\s+bank", "Equity Bank"),
        BankPattern::new(r"standard\s+chartered|stanchart", "Standard Chartered"),
        BankPattern::new(r"housing\s+finance", "Housing Finance Bank"),
        BankPattern::new(r"\bkcb\b", "KCB Bank"),
        BankPattern::new(r"bank\s+of\s+africa", "Bank of Africa"),
        BankPattern::new(r"ecobank", "Ecobank"),
        BankPattern::new(r"\bdtb\b|diamond\s+trust", "Diamond Trust Bank"),
        BankPattern::new(r"\bncba\b", "NCBA Bank"),
        BankPattern::new(r"i&m\s+bank", "I&M Bank"),
        BankPattern::new(r"postbank", "PostBank Uganda"),
        BankPattern::new(r"tropical\s+bank", "Tropical Bank"),
    ]
}

/// Ordered bank signatures; the first that matches names the bank.
#[derive(Debug, Clone)]
pub struct BankIdentityTable {
    entries: Vec<(Regex, String)>,
}

impl Default for BankIdentityTable {
    fn default() -> Self {
        Self::new(&default_bank_patterns()).expect("invalid default bank pattern")
    }
}

impl BankIdentityTable {
    pub fn new(patterns: &[BankPattern]) -> Result<Self, PdfError> {
        let entries = patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (re, p.name.clone()))
                    .map_err(|source| PdfError::BankPattern { pattern: p.pattern.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn detect(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .find(|(re, _)| re.is_match(&lower))
            .map(|(_, name)| name.clone())
    }
}

fn re_account() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)account[^0-9]{0,20}([0-9]{10})(?:[^0-9]|$)").expect("invalid regex"))
}

/// Last four digits of the 10-digit (ASCII) number following "account".
pub fn account_number(text: &str) -> Option<String> {
    let digits = re_account().captures(text)?.get(1)?.as_str();
    Some(digits[digits.len() - 4..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_bank_wins() {
        let table = BankIdentityTable::default();
        assert_eq!(table.detect("STANBIC BANK UGANDA LIMITED\nStatement").as_deref(), Some("Stanbic Bank"));
        assert_eq!(table.detect("Welcome to Equity Bank").as_deref(), Some("Equity Bank"));
        assert_eq!(table.detect("Generic Savings Co-op"), None);
    }

    #[test]
    fn custom_table_from_config() {
        let table = BankIdentityTable::new(&[BankPattern::new(r"acme\s+bank", "ACME")]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.detect("ACME   BANK statement").as_deref(), Some("ACME"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = BankIdentityTable::new(&[BankPattern::new("(", "Broken")]).unwrap_err();
        assert!(matches!(err, PdfError::BankPattern { .. }));
    }

    #[test]
    fn account_number_last_four() {
        assert_eq!(account_number("Account Number: 9030012345678").as_deref(), None);
        assert_eq!(account_number("Account No.: 9030012345").as_deref(), Some("2345"));
        assert_eq!(account_number("ACCOUNT 0123456789 SAVINGS").as_deref(), Some("6789"));
        assert_eq!(account_number("account holder john doe of kampala, 0123456789"), None);
    }

    #[test]
    fn account_number_ignores_non_ascii_digits() {
        assert_eq!(account_number("Account No: ०१२३४५६७८९"), None);
        assert_eq!(account_number("Account No: ०१२३ 9030012345").as_deref(), Some("2345"));
    }
}
