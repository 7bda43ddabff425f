use rust_decimal::Decimal;
use txscan_core::{Amount, CategoryTaxonomy, ParsedTransaction, StatementDiagnostics};
use txscan_import::{direction_of, scan_amounts, AmountMatch, CategoryClassifier, DateParser};

use crate::glyph::{Row, COLUMN_SEPARATOR};

/// Header and footer labels that never describe a transaction.
pub const ROW_BLOCKLIST: &[&str] = &[
    "total",
    "opening balance",
    "closing balance",
    "balance b/f",
    "brought forward",
    "carried forward",
    "trans date",
    "value date",
    "account no",
    "account number",
    "print date",
    "statement period",
    "page",
];

const MARKERS: &[&str] = &["dr", "cr", "debit", "credit"];

/// Why a row did or did not become a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Transaction(ParsedTransaction),
    NoDate,
    NoAmount,
    Blocklisted,
}

/// Turns reconstructed statement rows into transactions.
#[derive(Debug, Clone, Default)]
pub struct StatementTableParser {
    dates: DateParser,
    categories: CategoryClassifier,
}

impl StatementTableParser {
    pub fn new(dates: DateParser, taxonomy: CategoryTaxonomy) -> Self {
        Self { dates, categories: CategoryClassifier::new(taxonomy) }
    }

    pub fn parse_rows(&self, rows: &[Row]) -> (Vec<ParsedTransaction>, StatementDiagnostics) {
        let mut diagnostics = StatementDiagnostics::default();
        let mut transactions = Vec::new();

        for row in rows {
            diagnostics.rows_seen += 1;
            let text = row.text();
            match self.parse_row(&text) {
                RowOutcome::Transaction(tx) => transactions.push(tx),
                RowOutcome::NoDate => {
                    diagnostics.rows_without_date += 1;
                    tracing::trace!(page = row.page, row = %text, "row skipped: no date");
                }
                RowOutcome::NoAmount => {
                    diagnostics.rows_without_amount += 1;
                    tracing::debug!(page = row.page, row = %text, "row skipped: no amount");
                }
                RowOutcome::Blocklisted => {
                    diagnostics.rows_blocklisted += 1;
                    tracing::debug!(page = row.page, row = %text, "row skipped: header or footer");
                }
            }
        }
        (transactions, diagnostics)
    }

    /// Parse one rendered row (columns joined by [`COLUMN_SEPARATOR`]).
    pub fn parse_row(&self, text: &str) -> RowOutcome {
        let columns: Vec<&str> = text.split(COLUMN_SEPARATOR).map(str::trim).collect();

        let Some((date_idx, date)) = columns
            .iter()
            .enumerate()
            .find_map(|(i, col)| self.dates.try_parse_explicit(col).map(|d| (i, d)))
        else {
            return RowOutcome::NoDate;
        };

        let amounts = scan_amounts(text);
        let Some(amount) = pick_amount(&amounts) else {
            return RowOutcome::NoAmount;
        };

        let description = describe(&columns, date_idx, &amounts);
        if is_blocklisted(&description) {
            return RowOutcome::Blocklisted;
        }

        let tx_type = direction_of(text);
        let category = self.categories.classify(&description, tx_type);
        let confidence = category.confidence();

        RowOutcome::Transaction(
            ParsedTransaction::new(amount, &description, date, tx_type, text)
                .with_category(category.category)
                .with_confidence(confidence),
        )
    }
}

/// With two or more distinct amounts the smallest one above 1 is the
/// transaction (the others are running balances); otherwise the first.
fn pick_amount(amounts: &[AmountMatch]) -> Option<Amount> {
    let first = amounts.first()?.amount;
    let mut distinct: Vec<Amount> = Vec::new();
    for m in amounts {
        if !distinct.iter().any(|a| a.value() == m.amount.value()) {
            distinct.push(m.amount);
        }
    }
    if distinct.len() < 2 {
        return Some(first);
    }
    Some(
        distinct
            .into_iter()
            .filter(|a| a.value() > Decimal::ONE)
            .min_by(|a, b| a.value().cmp(&b.value()))
            .unwrap_or(first),
    )
}

fn describe(columns: &[&str], date_idx: usize, amounts: &[AmountMatch]) -> String {
    let is_amount = |col: &str| amounts.iter().any(|m| m.text == col);
    let is_marker = |col: &str| MARKERS.contains(&col.to_lowercase().as_str());

    let named = columns.iter().enumerate().find(|(i, col)| {
        *i != date_idx && !is_amount(**col) && !is_marker(**col) && col.chars().count() > 2
    });
    if let Some((_, col)) = named {
        return (*col).to_string();
    }

    let mut rest = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(_, col)| *col)
        .collect::<Vec<_>>()
        .join(" ");
    for m in amounts {
        rest = rest.replace(&m.text, " ");
    }
    let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    if rest.is_empty() {
        "Transaction".to_string()
    } else {
        rest
    }
}

/// Multi-word labels match anywhere; single words only as the leading word,
/// so "Page 2 of 5" is dropped but "Homepage Ltd" is not.
fn is_blocklisted(description: &str) -> bool {
    let lower = description.to_lowercase();
    let first_word = lower
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("");
    ROW_BLOCKLIST.iter().any(|label| {
        if label.contains(' ') {
            lower.contains(label)
        } else {
            first_word == *label
        }
    })
}
