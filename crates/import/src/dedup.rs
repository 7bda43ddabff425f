use txscan_core::ParsedTransaction;

/// Leading description characters compared when matching duplicates.
pub const DESCRIPTION_PREFIX_CHARS: usize = 20;

fn prefix(description: &str) -> impl Iterator<Item = char> + '_ {
    description.chars().take(DESCRIPTION_PREFIX_CHARS)
}

/// Same date, amounts within a cent, same description prefix.
pub fn is_equivalent(a: &ParsedTransaction, b: &ParsedTransaction) -> bool {
    a.date == b.date && a.amount.approx_eq(b.amount) && prefix(&a.description).eq(prefix(&b.description))
}

/// Drop later duplicates; the first occurrence of each transaction wins and
/// the survivors keep their input order.
pub fn deduplicate(items: Vec<ParsedTransaction>) -> Vec<ParsedTransaction> {
    let mut kept: Vec<ParsedTransaction> = Vec::with_capacity(items.len());
    for tx in items {
        if !kept.iter().any(|k| is_equivalent(k, &tx)) {
            kept.push(tx);
        }
    }
    kept
}
