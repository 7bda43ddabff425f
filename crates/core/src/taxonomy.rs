use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::transaction::TransactionType;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse taxonomy TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Keyword rule references unknown {kind} category '{category}'")]
    UnknownCategory { kind: TransactionType, category: String },
    #[error("Default {kind} category '{category}' is not in the taxonomy")]
    MissingDefault { kind: TransactionType, category: String },
}

/// An ordered keyword list mapped to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        KeywordRule {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The closed set of category labels plus the keyword tables that map text
/// onto them. Supplied as configuration; `Default` carries the built-in set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTaxonomy {
    pub expense: Vec<String>,
    pub income: Vec<String>,
    /// Tested in order; first keyword hit wins.
    pub expense_keywords: Vec<KeywordRule>,
    pub income_keywords: Vec<KeywordRule>,
    pub default_expense: String,
    pub default_income: String,
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        let labels = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        CategoryTaxonomy {
            expense: labels(DEFAULT_EXPENSE_CATEGORIES),
            income: labels(DEFAULT_INCOME_CATEGORIES),
            expense_keywords: default_expense_keywords(),
            income_keywords: default_income_keywords(),
            default_expense: "Other".to_string(),
            default_income: "Other Income".to_string(),
        }
    }
}

impl CategoryTaxonomy {
    pub fn from_toml(toml_content: &str) -> Result<Self, TaxonomyError> {
        let taxonomy: CategoryTaxonomy = toml::from_str(toml_content)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Every keyword rule and default must point at a member of its list.
    pub fn validate(&self) -> Result<(), TaxonomyError> {
        for kind in [TransactionType::Expense, TransactionType::Income] {
            let members = self.categories(kind);
            let fallback = self.fallback(kind);
            if !contains_ci(members, fallback) {
                return Err(TaxonomyError::MissingDefault { kind, category: fallback.to_string() });
            }
            if let Some(rule) = self.keywords(kind).iter().find(|r| !contains_ci(members, &r.category)) {
                return Err(TaxonomyError::UnknownCategory { kind, category: rule.category.clone() });
            }
        }
        Ok(())
    }

    pub fn categories(&self, kind: TransactionType) -> &[String] {
        match kind {
            TransactionType::Expense => &self.expense,
            TransactionType::Income => &self.income,
        }
    }

    pub fn keywords(&self, kind: TransactionType) -> &[KeywordRule] {
        match kind {
            TransactionType::Expense => &self.expense_keywords,
            TransactionType::Income => &self.income_keywords,
        }
    }

    pub fn fallback(&self, kind: TransactionType) -> &str {
        match kind {
            TransactionType::Expense => &self.default_expense,
            TransactionType::Income => &self.default_income,
        }
    }

    /// Case-insensitive lookup returning the canonical label.
    pub fn member(&self, kind: TransactionType, label: &str) -> Option<&str> {
        let needle = label.trim().to_lowercase();
        self.categories(kind)
            .iter()
            .find(|c| c.to_lowercase() == needle)
            .map(String::as_str)
    }
}

fn contains_ci(members: &[String], label: &str) -> bool {
    members.iter().any(|m| m.eq_ignore_ascii_case(label))
}

pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Groceries",
    "Fuel",
    "Transport",
    "Utilities",
    "Airtime & Data",
    "Rent & Housing",
    "Health",
    "Education",
    "Bank Charges",
    "Entertainment",
    "Shopping",
    "Transfers",
    "Other",
];

pub const DEFAULT_INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Business",
    "Refund",
    "Investment",
    "Gift",
    "Other Income",
    "Other",
];

fn default_expense_keywords() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            "Food & Dining",
            &[
                "restaurant", "cafe", "coffee", "lunch", "dinner", "breakfast", "food", "pizza",
                "chicken", "kfc", "meal", "snack", "drinks", "java house", "cafeteria",
            ],
        ),
        KeywordRule::new(
            "Groceries",
            &[
                "supermarket", "grocery", "groceries", "shoprite", "carrefour", "capital shoppers",
                "mega standard", "market", "vegetables", "sugar", "bread", "milk",
            ],
        ),
        KeywordRule::new("Fuel", &["fuel", "petrol", "diesel", "stabex", "total energies", "shell", "gas station"]),
        KeywordRule::new(
            "Transport",
            &["uber", "bolt", "safeboda", "safe boda", "taxi", "boda", "bus", "transport", "fare", "parking"],
        ),
        KeywordRule::new(
            "Utilities",
            &["electricity", "umeme", "yaka", "water bill", "nwsc", "utility", "power bill"],
        ),
        KeywordRule::new("Airtime & Data", &["airtime", "data bundle", "bundle", "internet", "wifi"]),
        KeywordRule::new("Rent & Housing", &["rent", "landlord", "housing", "mortgage"]),
        KeywordRule::new("Health", &["hospital", "pharmacy", "clinic", "medical", "doctor", "medicine"]),
        KeywordRule::new("Education", &["school", "tuition", "university", "college", "course", "textbook"]),
        KeywordRule::new(
            "Bank Charges",
            &[
                "bank charge", "charges", "commission", "service fee", "ledger fee", "excise duty",
                "withdrawal fee", "transaction fee", "sms fee",
            ],
        ),
        KeywordRule::new(
            "Entertainment",
            &["movie", "cinema", "netflix", "showmax", "dstv", "gotv", "spotify", "concert"],
        ),
        KeywordRule::new("Shopping", &["shopping", "clothes", "shoes", "jumia", "amazon", "electronics"]),
        KeywordRule::new("Transfers", &["transfer", "sent to", "send money", "withdraw", "atm"]),
    ]
}

fn default_income_keywords() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new("Salary", &["salary", "payroll", "wages", "stipend"]),
        KeywordRule::new("Refund", &["refund", "reversal", "cashback", "reversed"]),
        KeywordRule::new("Investment", &["interest", "dividend", "profit share"]),
        KeywordRule::new("Business", &["sales", "business", "client", "invoice", "customer payment"]),
        KeywordRule::new("Gift", &["gift", "donation", "contribution"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_taxonomy_is_valid() {
        CategoryTaxonomy::default().validate().unwrap();
    }

    #[test]
    fn default_tables_are_disjoint() {
        let t = CategoryTaxonomy::default();
        let expense: Vec<&String> = t.expense_keywords.iter().flat_map(|r| &r.keywords).collect();
        for rule in &t.income_keywords {
            for kw in &rule.keywords {
                assert!(!expense.contains(&kw), "keyword '{kw}' in both tables");
            }
        }
    }

    #[test]
    fn from_toml_custom_taxonomy() {
        let toml = r#"
            expense = ["Coffee", "Other"]
            income = ["Salary", "Other Income"]
            default_expense = "Other"
            default_income = "Other Income"

            [[expense_keywords]]
            category = "Coffee"
            keywords = ["espresso", "latte"]

            [[income_keywords]]
            category = "Salary"
            keywords = ["salary"]
        "#;
        let t = CategoryTaxonomy::from_toml(toml).unwrap();
        assert_eq!(t.expense, vec!["Coffee", "Other"]);
        assert_eq!(t.expense_keywords[0].keywords, vec!["espresso", "latte"]);
    }

    #[test]
    fn from_toml_rejects_unknown_keyword_category() {
        let toml = r#"
            expense = ["Other"]
            expense_keywords = [{ category = "Coffee", keywords = ["latte"] }]
            income_keywords = []
        "#;
        let err = CategoryTaxonomy::from_toml(toml).unwrap_err();
        assert!(matches!(err, TaxonomyError::UnknownCategory { .. }), "got {err}");
    }

    #[test]
    fn from_toml_rejects_missing_default() {
        let toml = r#"
            expense = ["Coffee"]
            expense_keywords = []
        "#;
        let err = CategoryTaxonomy::from_toml(toml).unwrap_err();
        assert!(matches!(err, TaxonomyError::MissingDefault { .. }), "got {err}");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_income = \"Gift\"").unwrap();
        let t = CategoryTaxonomy::load(file.path()).unwrap();
        assert_eq!(t.fallback(TransactionType::Income), "Gift");
        assert_eq!(t.fallback(TransactionType::Expense), "Other");
    }

    #[test]
    fn member_lookup_is_case_insensitive() {
        let t = CategoryTaxonomy::default();
        assert_eq!(t.member(TransactionType::Expense, "groceries"), Some("Groceries"));
        assert_eq!(t.member(TransactionType::Income, "groceries"), None);
    }
}
