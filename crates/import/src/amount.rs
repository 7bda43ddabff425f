use regex::Captures;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use txscan_core::Amount;

use crate::util::{re, PatternChain, PatternRule};

/// Upper bound for amounts found through generic labels ("total", "paid", …).
/// Anything larger is far more likely a phone number or a reference code.
pub const GENERIC_AMOUNT_LIMIT: i64 = 100_000_000;

// ── Compiled regex cache ─────────────────────────────────────────────────────

re!(re_leading_currency,
    r"(?i)^\s*(?:ugx|ushs?|shs?|kes|kshs?|usd|eur|gbp|[$€£])\.?\s*");
re!(re_trailing_currency,
    r"(?i)\s*(?:/=|=|ugx|ushs?|shs?|kes|kshs?|usd|eur|gbp)\.?\s*$");

re!(re_currency_prefix,
    r"(?i)(?:\b(?:ugx|ushs?|shs?|kes|kshs?|usd)\b\.?|[$€£])\s*(\d[\d,]*(?:\.\d{1,2})?)(?:\s*([kmb])\b)?");
re!(re_currency_suffix,
    r"(?i)(\d[\d,]*(?:\.\d{1,2})?)(?:\s*([kmb]))?\s*(?:/=|(?:ugx|ushs?|shs?|kes|kshs?|usd)\b)");
re!(re_amount_label,
    r"(?i)\b(?:amt|amount)\b\.?\s*[:\-]?\s*(?:(?:ugx|ushs?|shs?|kes|kshs?|usd)\.?\s*)?(\d[\d,]*(?:\.\d{1,2})?)(?:\s*([kmb])\b)?");
re!(re_debit_credit_prefix,
    r"(?i)\b(?:dr|cr|debit(?:ed)?|credit(?:ed)?)\b\s*(?:with|of|by)?\s*[:\-]?\s*(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_debit_credit_suffix,
    r"(?i)(\d[\d,]*\.\d{2})\s*(?:dr|cr)\b");
re!(re_generic_label,
    r"(?i)\b(?:grand\s+total|total|paid|spent|spend|cost|price|pay)\b\s*(?:of|for)?\s*[:\-=]?\s*(\d[\d,]*(?:\.\d{1,2})?)(?:\s*([kmb])\b)?");

re!(re_statement_amount,
    r"(?i)(?P<cur>\b(?:ugx|ushs?|shs?|kes|kshs?|usd)\b\.?\s*|[$€£]\s*)?(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+\.\d{2}|\d{3,9})");

// ── Token parsing ────────────────────────────────────────────────────────────

/// Parse one amount token such as `UGX 5,000`, `$12.50`, `60k` or `1.5m`.
///
/// Returns `None` for non-numeric content, zero and negative values.
pub fn parse_amount(token: &str) -> Option<Amount> {
    let s = token.trim();
    let s = re_leading_currency().replace(s, "");
    let s = re_trailing_currency().replace(&s, "");
    let s: String = s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    let s = s.to_lowercase();

    if s.is_empty() || s.starts_with('-') || s.starts_with('(') {
        return None;
    }

    let (digits, multiplier) = match s.char_indices().last() {
        Some((i, 'k')) => (&s[..i], Decimal::from(1_000)),
        Some((i, 'm')) => (&s[..i], Decimal::from(1_000_000)),
        Some((i, 'b')) => (&s[..i], Decimal::from(1_000_000_000)),
        _ => (s.as_str(), Decimal::ONE),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value = Decimal::from_str(digits).ok()?.checked_mul(multiplier)?;
    Amount::new(value)
}

// ── Labeled extraction ───────────────────────────────────────────────────────

fn number_with_suffix(caps: &Captures<'_>) -> Option<Amount> {
    let number = caps.get(1)?.as_str();
    let suffix = caps.get(2).map_or("", |m| m.as_str());
    parse_amount(&format!("{number}{suffix}"))
}

fn bounded_number(caps: &Captures<'_>) -> Option<Amount> {
    number_with_suffix(caps).filter(|a| a.value() < Decimal::from(GENERIC_AMOUNT_LIMIT))
}

fn labeled_chain() -> &'static PatternChain<Amount> {
    static CHAIN: OnceLock<PatternChain<Amount>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "currency_prefix", regex: re_currency_prefix, handler: number_with_suffix },
            PatternRule { name: "currency_suffix", regex: re_currency_suffix, handler: number_with_suffix },
            PatternRule { name: "amount_label", regex: re_amount_label, handler: number_with_suffix },
            PatternRule { name: "debit_credit_prefix", regex: re_debit_credit_prefix, handler: number_with_suffix },
            PatternRule { name: "debit_credit_suffix", regex: re_debit_credit_suffix, handler: number_with_suffix },
            PatternRule { name: "generic_label", regex: re_generic_label, handler: bounded_number },
        ])
    })
}

/// Scan free text for the first amount carried by a recognised label.
pub fn extract_amount(text: &str) -> Option<Amount> {
    labeled_chain().first_match(text)
}

/// Same as [`extract_amount`], also naming the pattern that matched.
pub fn extract_amount_with_rule(text: &str) -> Option<(&'static str, Amount)> {
    labeled_chain().first_match_named(text)
}

// ── Statement scanning ───────────────────────────────────────────────────────

/// A formatted amount found in a statement row.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMatch {
    pub amount: Amount,
    /// The substring exactly as it appeared in the row.
    pub text: String,
}

/// Every amount-like token in `text`, in order: thousands-separated or
/// two-decimal numbers, bare integers of 3 to 9 digits, each optionally
/// preceded by a currency marker.
///
/// Numbers glued to further digits or to date punctuation (`12.03.2023`,
/// `01/03/2024`, long references) are skipped, as are zero values. A bare
/// unmarked four-digit number between 1900 and 2099 reads as a year.
pub fn scan_amounts(text: &str) -> Vec<AmountMatch> {
    re_statement_amount()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let num = caps.name("num")?;
            if is_glued(text, whole.start(), whole.end()) {
                return None;
            }
            if caps.name("cur").is_none() && looks_like_year(num.as_str()) {
                return None;
            }
            let amount = parse_amount(whole.as_str())?;
            Some(AmountMatch { amount, text: whole.as_str().to_string() })
        })
        .collect()
}

fn is_glued(text: &str, start: usize, end: usize) -> bool {
    let mut before = text[..start].chars().rev();
    let mut after = text[end..].chars();
    joins_digits(before.next(), before.next()) || joins_digits(after.next(), after.next())
}

/// `next` is the neighbouring char, `beyond` the one past it.
fn joins_digits(next: Option<char>, beyond: Option<char>) -> bool {
    match (next, beyond) {
        (Some(c), _) if c.is_ascii_digit() => true,
        (Some('.' | ',' | '/' | '-'), Some(d)) => d.is_ascii_digit(),
        _ => false,
    }
}

fn looks_like_year(num: &str) -> bool {
    num.len() == 4 && num.parse::<u16>().is_ok_and(|y| (1900..=2099).contains(&y))
}
