use txscan_core::ParsedTransaction;

/// Runner-up confidence at which pooled candidates are all kept.
pub const ARBITER_THRESHOLD: u8 = 70;

/// Pick the final candidates from a pooled `single`-mode run.
///
/// Candidates are ordered by confidence (stable for ties). When the runner-up
/// reaches the threshold every candidate at or above it survives; otherwise
/// only the best one does.
pub fn arbitrate(mut candidates: Vec<ParsedTransaction>) -> Vec<ParsedTransaction> {
    candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    match candidates.get(1) {
        Some(runner_up) if runner_up.confidence >= ARBITER_THRESHOLD => {
            candidates.retain(|c| c.confidence >= ARBITER_THRESHOLD);
        }
        _ => candidates.truncate(1),
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use txscan_core::{Amount, TransactionType};

    fn candidate(desc: &str, confidence: u8) -> ParsedTransaction {
        let amount = Amount::new(Decimal::from(1_000)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ParsedTransaction::new(amount, desc, date, TransactionType::Expense, desc).with_confidence(confidence)
    }

    fn confidences(items: &[ParsedTransaction]) -> Vec<u8> {
        items.iter().map(|t| t.confidence).collect()
    }

    #[test]
    fn strong_runner_up_keeps_all_above_threshold() {
        let kept = arbitrate(vec![candidate("a", 40), candidate("b", 90), candidate("c", 75)]);
        assert_eq!(confidences(&kept), vec![90, 75]);
    }

    #[test]
    fn weak_runner_up_keeps_only_the_best() {
        let kept = arbitrate(vec![candidate("a", 60), candidate("b", 85), candidate("c", 69)]);
        assert_eq!(confidences(&kept), vec![85]);
    }

    #[test]
    fn ties_keep_input_order() {
        let kept = arbitrate(vec![candidate("first", 80), candidate("second", 80)]);
        let descs: Vec<_> = kept.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["first", "second"]);
    }

    #[test]
    fn empty_and_single_pools() {
        assert!(arbitrate(Vec::new()).is_empty());
        assert_eq!(confidences(&arbitrate(vec![candidate("only", 10)])), vec![10]);
    }
}
