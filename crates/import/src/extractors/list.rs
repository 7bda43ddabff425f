use regex::Captures;
use std::sync::OnceLock;
use txscan_core::{Amount, ParsedTransaction};

use super::{ExtractContext, LIST_CONFIDENCE};
use crate::amount::parse_amount;
use crate::direction::direction_of;
use crate::util::{clean_label, letter_count, re, PatternChain, PatternRule};

// ── Segment shapes ───────────────────────────────────────────────────────────

re!(re_desc_amount,
    r"(?i)^(?P<desc>[a-z][a-z &'/.()]*?)\s*[:=]?\s*(?P<amt>(?:(?:ugx|ushs?|shs?|kes|usd)\.?\s*|[$€£]\s*)?\d[\d,]*(?:\.\d+)?(?:\s*[kmb])?(?:\s*/=)?)$");
re!(re_desc_dash_amount,
    r"(?i)^(?P<desc>[a-z][a-z &'/.()]*?)\s+[-–—]\s*(?P<amt>(?:(?:ugx|ushs?|shs?|kes|usd)\.?\s*|[$€£]\s*)?\d[\d,]*(?:\.\d+)?(?:\s*[kmb])?(?:\s*/=)?)$");
re!(re_amount_desc,
    r"(?i)^(?P<amt>(?:(?:ugx|ushs?|shs?|kes|usd)\.?\s*|[$€£]\s*)?\d[\d,]*(?:\.\d+)?(?:[kmb]\b)?(?:\s*/=)?)\s+(?P<desc>[a-z][a-z0-9 &'/.()\-]*)$");
re!(re_amount_for_desc,
    r"(?i)^(?P<amt>(?:(?:ugx|ushs?|shs?|kes|usd)\.?\s*|[$€£]\s*)?\d[\d,]*(?:\.\d+)?(?:[kmb]\b)?(?:\s*/=)?)\s+(?:for|on)\s+(?P<desc>[a-z][a-z0-9 &'/.()\-]*)$");
re!(re_numeric_token, r"\d");

/// Summary labels that are never list entries of their own.
const NOT_AN_ENTRY: &[&str] = &["total", "subtotal", "sub total", "grand total", "balance", "change"];

#[derive(Debug, Clone, PartialEq)]
struct ListEntry {
    description: String,
    amount: Amount,
}

fn entry(caps: &Captures<'_>) -> Option<ListEntry> {
    let description = clean_label(caps.name("desc")?.as_str());
    if letter_count(&description) < 2 || NOT_AN_ENTRY.contains(&description.to_lowercase().as_str()) {
        return None;
    }
    let amount = parse_amount(caps.name("amt")?.as_str())?;
    Some(ListEntry { description, amount })
}

/// "500 for bread" belongs to the next shape, not this one.
fn amount_then_desc(caps: &Captures<'_>) -> Option<ListEntry> {
    let desc = caps.name("desc")?.as_str().to_lowercase();
    if desc.starts_with("for ") || desc.starts_with("on ") {
        return None;
    }
    entry(caps)
}

fn segment_chain() -> &'static PatternChain<ListEntry> {
    static CHAIN: OnceLock<PatternChain<ListEntry>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "desc_amount", regex: re_desc_amount, handler: entry },
            PatternRule { name: "desc_dash_amount", regex: re_desc_dash_amount, handler: entry },
            PatternRule { name: "amount_desc", regex: re_amount_desc, handler: amount_then_desc },
            PatternRule { name: "amount_for_desc", regex: re_amount_for_desc, handler: entry },
        ])
    })
}

// ── Splitting ────────────────────────────────────────────────────────────────

/// Split on newlines, semicolons and commas, keeping thousands separators
/// (`1,500`) inside their number.
pub fn split_segments(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let is_break = match c {
            '\n' | '\r' | ';' => true,
            ',' => !is_thousands_comma(&chars, i),
            _ => false,
        };
        if is_break {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_thousands_comma(chars: &[char], i: usize) -> bool {
    let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
    let three_after = chars.len() > i + 3 && chars[i + 1..=i + 3].iter().all(char::is_ascii_digit);
    let group_ends = chars.get(i + 4).map_or(true, |c| !c.is_ascii_digit());
    digit_before && three_after && group_ends
}

/// Segments that carry at least one number.
pub fn numeric_segments(text: &str) -> usize {
    split_segments(text)
        .iter()
        .filter(|s| re_numeric_token().is_match(s))
        .count()
}

pub fn applies(text: &str) -> bool {
    split_segments(text).iter().any(|s| segment_chain().first_match(s).is_some())
}

pub fn extract(text: &str, ctx: &ExtractContext<'_>) -> Vec<ParsedTransaction> {
    split_segments(text)
        .iter()
        .filter_map(|segment| {
            let entry = segment_chain().first_match(segment)?;
            let tx_type = direction_of(&entry.description);
            let tx = ctx.transaction(entry.amount, &entry.description, &entry.description, tx_type, segment, LIST_CONFIDENCE);
            // The segment rarely names a date; the surrounding message might.
            Some(ParsedTransaction { date: ctx.dates.parse(text), ..tx })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryClassifier;
    use crate::date::DateParser;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use txscan_core::TransactionType;

    fn run(text: &str) -> Vec<ParsedTransaction> {
        let dates = DateParser::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let categories = CategoryClassifier::default();
        extract(text, &ExtractContext { dates: &dates, categories: &categories })
    }

    fn amounts(items: &[ParsedTransaction]) -> Vec<Decimal> {
        items.iter().map(|t| t.amount.value()).collect()
    }

    #[test]
    fn split_keeps_thousands_separators() {
        assert_eq!(split_segments("Rent 1,500,000, Food 60k"), vec!["Rent 1,500,000", "Food 60k"]);
        assert_eq!(split_segments("a 1,50, b 2"), vec!["a 1", "50", "b 2"]);
        assert_eq!(split_segments("x; y\n\nz"), vec!["x", "y", "z"]);
    }

    #[test]
    fn food_and_fuel() {
        let items = run("Food 60k, Fuel 40k");
        assert_eq!(amounts(&items), vec![Decimal::from(60_000), Decimal::from(40_000)]);
        assert_eq!(items[0].category, "Food & Dining");
        assert_eq!(items[1].category, "Fuel");
        assert!(items.iter().all(|t| t.confidence == LIST_CONFIDENCE));
    }

    #[test]
    fn all_four_shapes() {
        let items = run("Lunch: 15,000\nTaxi - 5k\n2500 airtime\n3000 for bread");
        let descs: Vec<_> = items.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["Lunch", "Taxi", "airtime", "bread"]);
        assert_eq!(
            amounts(&items),
            vec![Decimal::from(15_000), Decimal::from(5_000), Decimal::from(2_500), Decimal::from(3_000)]
        );
    }

    #[test]
    fn segments_without_amounts_are_skipped() {
        let items = run("Expenses today\nsugar 7,000\nnothing else");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "sugar");
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn income_lines_keep_their_direction() {
        let items = run("salary 2m, rent 500k");
        assert_eq!(items[0].tx_type, TransactionType::Income);
        assert_eq!(items[0].category, "Salary");
        assert_eq!(items[1].tx_type, TransactionType::Expense);
    }

    #[test]
    fn summary_labels_are_not_entries() {
        assert!(run("Total: 2,500.00").is_empty());
        assert!(!applies("Balance 10,000"));
    }

    #[test]
    fn counts_numeric_segments() {
        assert_eq!(numeric_segments("Food 60k, Fuel 40k, misc"), 2);
        assert_eq!(numeric_segments("paid 5000 for lunch"), 1);
    }
}
