use std::sync::Arc;
use txscan_core::{CategoryTaxonomy, TransactionType};

use crate::util::normalize;

/// Confidence granted when a keyword matched.
pub const KEYWORD_HIT_CONFIDENCE: u8 = 85;
/// Confidence when the classifier fell back to the default category.
pub const DEFAULT_CATEGORY_CONFIDENCE: u8 = 50;

/// Built-in income shortcuts consulted before the income keyword table.
const INCOME_SPECIAL_CASES: &[(&[&str], &str)] = &[
    (&["salary", "payroll"], "Salary"),
    (&["refund", "reversal"], "Refund"),
    (&["interest", "dividend"], "Investment"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: String,
    /// Whether a keyword matched, as opposed to the default category.
    pub keyword_hit: bool,
}

impl CategoryMatch {
    pub fn confidence(&self) -> u8 {
        if self.keyword_hit {
            KEYWORD_HIT_CONFIDENCE
        } else {
            DEFAULT_CATEGORY_CONFIDENCE
        }
    }
}

/// Keyword-table classifier over an injected [`CategoryTaxonomy`].
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    taxonomy: Arc<CategoryTaxonomy>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(CategoryTaxonomy::default())
    }
}

impl CategoryClassifier {
    pub fn new(taxonomy: CategoryTaxonomy) -> Self {
        Self { taxonomy: Arc::new(taxonomy) }
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn classify(&self, text: &str, kind: TransactionType) -> CategoryMatch {
        let lower = normalize(text);

        if kind == TransactionType::Income {
            let special = INCOME_SPECIAL_CASES
                .iter()
                .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
                .and_then(|(_, label)| self.taxonomy.member(kind, label));
            if let Some(category) = special {
                return CategoryMatch { category: category.to_string(), keyword_hit: true };
            }
        }

        let hit = self.taxonomy.keywords(kind).iter().find(|rule| {
            rule.keywords
                .iter()
                .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
        });

        match hit {
            Some(rule) => CategoryMatch {
                category: self.canonical(kind, &rule.category),
                keyword_hit: true,
            },
            None => CategoryMatch {
                category: self.taxonomy.fallback(kind).to_string(),
                keyword_hit: false,
            },
        }
    }

    /// Coerce a free-form label onto the taxonomy.
    ///
    /// Exact (case-insensitive) matches win, then substring containment in
    /// either direction, then `"Other"`. Taxonomies without an `"Other"` member
    /// fall back to their configured default instead.
    pub fn validate_category(&self, raw: &str, kind: TransactionType) -> String {
        let needle = normalize(raw);
        if needle.is_empty() {
            return self.unmatched(kind);
        }
        if let Some(member) = self.taxonomy.member(kind, &needle) {
            return member.to_string();
        }
        self.taxonomy
            .categories(kind)
            .iter()
            .find(|c| {
                let label = c.to_lowercase();
                label.contains(&needle) || needle.contains(&label)
            })
            .cloned()
            .unwrap_or_else(|| self.unmatched(kind))
    }

    fn unmatched(&self, kind: TransactionType) -> String {
        self.taxonomy
            .member(kind, "Other")
            .unwrap_or_else(|| self.default_member(kind))
            .to_string()
    }

    fn default_member(&self, kind: TransactionType) -> &str {
        let fallback = self.taxonomy.fallback(kind);
        self.taxonomy.member(kind, fallback).unwrap_or(fallback)
    }

    fn canonical(&self, kind: TransactionType, label: &str) -> String {
        self.taxonomy
            .member(kind, label)
            .unwrap_or(label)
            .to_string()
    }
}
