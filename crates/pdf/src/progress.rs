/// Receives `(label, percent)` milestones while a statement is parsed.
/// Implementations must return quickly; the parser does not wait on them.
pub trait ProgressSink: Send + Sync {
    fn report(&self, label: &str, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn report(&self, label: &str, percent: u8) {
        self(label, percent)
    }
}

/// Discards every milestone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _label: &str, _percent: u8) {}
}

pub const LOADED: u8 = 5;
pub const PAGES_START: u8 = 10;
pub const PAGES_END: u8 = 70;
pub const ROWS_BUILT: u8 = 75;
pub const TABLE_PARSED: u8 = 85;
pub const BANK_DETECTED: u8 = 92;
pub const DONE: u8 = 100;

/// Percent reached after reading page `page` (1-based) of `total`.
pub fn page_percent(page: usize, total: usize) -> u8 {
    if total == 0 {
        return PAGES_END;
    }
    let span = usize::from(PAGES_END - PAGES_START);
    let done = page.min(total);
    PAGES_START + (span * done / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn page_percent_spans_ten_to_seventy() {
        assert_eq!(page_percent(1, 1), 70);
        assert_eq!(page_percent(1, 3), 30);
        assert_eq!(page_percent(3, 3), 70);
        assert_eq!(page_percent(0, 0), 70);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |label: &str, pct: u8| seen.lock().unwrap().push((label.to_string(), pct));
        sink.report("Loading", LOADED);
        NoProgress.report("ignored", DONE);
        assert_eq!(seen.into_inner().unwrap(), vec![("Loading".to_string(), 5)]);
    }
}
