use txscan_core::ParsedTransaction;

use super::{ExtractContext, GENERIC_CONFIDENCE};
use crate::amount::extract_amount;
use crate::direction::direction_of;
use crate::util::clean_label;

/// One transaction from the whole text: the first labeled amount, the first
/// line as description.
pub fn extract(text: &str, ctx: &ExtractContext<'_>) -> Option<ParsedTransaction> {
    let amount = extract_amount(text)?;
    let description = text
        .lines()
        .map(clean_label)
        .find(|l| !l.is_empty())
        .unwrap_or_else(|| "Transaction".to_string());
    Some(ctx.transaction(amount, &description, text, direction_of(text), text, GENERIC_CONFIDENCE))
}
