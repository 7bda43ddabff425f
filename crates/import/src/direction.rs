use txscan_core::TransactionType;

use crate::util::{contains_word, normalize, re};

re!(re_trailing_cr, r"(?i)\bcr\.?\s*$");

/// Words that mark money flowing in.
pub const INCOME_KEYWORDS: &[&str] = &[
    "salary",
    "payroll",
    "inflow",
    "refund",
    "reversal",
    "reversed",
    "cashback",
    "dividend",
    "interest",
    "received",
    "incoming",
];

/// Decide whether a statement row or message describes incoming money.
///
/// A trailing `CR` marker, the words credit/deposit, or any income keyword
/// mark income; everything else is an expense.
pub fn is_income_transaction(text: &str) -> bool {
    let lower = normalize(text);
    if re_trailing_cr().is_match(text.trim_end()) {
        return true;
    }
    // A bare CR column, unless the row also carries a DR marker.
    if contains_word(&lower, "cr") && !contains_word(&lower, "dr") {
        return true;
    }
    let credit_words = ["credit", "credited", "deposit", "deposited"];
    if credit_words.iter().any(|w| contains_word(&lower, w)) {
        return true;
    }
    INCOME_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn direction_of(text: &str) -> TransactionType {
    if is_income_transaction(text) {
        TransactionType::Income
    } else {
        TransactionType::Expense
    }
}
