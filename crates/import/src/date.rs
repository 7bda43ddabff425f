use chrono::{Days, Local, NaiveDate};
use regex::Captures;
use std::sync::OnceLock;

use crate::util::{contains_word, normalize, re, PatternChain, PatternRule};

// ── Compiled regex cache ─────────────────────────────────────────────────────

re!(re_iso,
    r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b");
re!(re_numeric_dmy,
    r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})\b");
re!(re_day_month_name,
    r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?[\s\-/.,]+([a-z]{3,9})\.?[\s\-/.,]+(\d{4}|\d{2})\b");
re!(re_month_name_day,
    r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4}|\d{2})\b");
re!(re_compact_day_mon,
    r"(?i)\b(\d{1,2})([a-z]{3,9})(\d{4})\b");
re!(re_compact_ddmmyy,
    r"\b(\d{2})(\d{2})(\d{2})\b");

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Multi-format date recognition with a fixed notion of "today".
///
/// Output is always a calendar-valid `NaiveDate`; callers render it as
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    today: NaiveDate,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::local()
    }
}

impl DateParser {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// A parser anchored on the local wall clock.
    pub fn local() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Recognise a date in `text`, or fall back to today.
    pub fn parse(&self, text: &str) -> NaiveDate {
        self.try_parse(text).unwrap_or(self.today)
    }

    /// Recognise a date in `text`; `None` when no pattern accepts it.
    pub fn try_parse(&self, text: &str) -> Option<NaiveDate> {
        self.relative(text).or_else(|| date_chain().first_match(text))
    }

    /// Only written-out dates; relative words like "today" are ignored.
    /// Statement columns use this so a narration never passes for a date.
    pub fn try_parse_explicit(&self, text: &str) -> Option<NaiveDate> {
        date_chain().first_match(text)
    }

    fn relative(&self, text: &str) -> Option<NaiveDate> {
        let lower = normalize(text);
        if contains_word(&lower, "yesterday") {
            self.today.checked_sub_days(Days::new(1))
        } else if lower.contains("last week") {
            self.today.checked_sub_days(Days::new(7))
        } else if contains_word(&lower, "today") {
            Some(self.today)
        } else {
            None
        }
    }
}

fn date_chain() -> &'static PatternChain<NaiveDate> {
    static CHAIN: OnceLock<PatternChain<NaiveDate>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "iso", regex: re_iso, handler: iso },
            PatternRule { name: "numeric_dmy", regex: re_numeric_dmy, handler: numeric_dmy },
            PatternRule { name: "day_month_name", regex: re_day_month_name, handler: day_month_name },
            PatternRule { name: "month_name_day", regex: re_month_name_day, handler: month_name_day },
            PatternRule { name: "compact_day_mon", regex: re_compact_day_mon, handler: day_month_name },
            // Last on purpose: six bare digits are usually a reference number.
            PatternRule { name: "compact_ddmmyy", regex: re_compact_ddmmyy, handler: compact_ddmmyy },
        ])
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

fn num(caps: &Captures<'_>, i: usize) -> Option<u32> {
    caps.get(i)?.as_str().parse().ok()
}

fn year(caps: &Captures<'_>, i: usize) -> Option<i32> {
    let raw = caps.get(i)?.as_str();
    let y: i32 = raw.parse().ok()?;
    match raw.len() {
        2 => Some(expand_year(y)),
        4 => Some(y),
        _ => None,
    }
}

/// Two-digit years pivot at 50: `50..=99` are 19xx, `00..=49` are 20xx.
pub fn expand_year(y: i32) -> i32 {
    if y >= 50 {
        1900 + y
    } else {
        2000 + y
    }
}

/// Month number for a full or abbreviated (3+ letters) English month name.
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| i as u32 + 1)
}

fn iso(caps: &Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(caps.get(1)?.as_str().parse().ok()?, num(caps, 2)?, num(caps, 3)?)
}

fn numeric_dmy(caps: &Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year(caps, 3)?, num(caps, 2)?, num(caps, 1)?)
}

fn day_month_name(caps: &Captures<'_>) -> Option<NaiveDate> {
    let month = month_from_name(caps.get(2)?.as_str())?;
    NaiveDate::from_ymd_opt(year(caps, 3)?, month, num(caps, 1)?)
}

fn month_name_day(caps: &Captures<'_>) -> Option<NaiveDate> {
    let month = month_from_name(caps.get(1)?.as_str())?;
    NaiveDate::from_ymd_opt(year(caps, 3)?, month, num(caps, 2)?)
}

fn compact_ddmmyy(caps: &Captures<'_>) -> Option<NaiveDate> {
    let day = num(caps, 1)?;
    let month = num(caps, 2)?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year(caps, 3)?, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn parser() -> DateParser {
        DateParser::new(d(2024, 6, 15))
    }

    fn canonical(text: &str) -> Option<String> {
        parser().try_parse(text).map(|x| x.format("%Y-%m-%d").to_string())
    }

    #[test]
    fn iso_is_unchanged() {
        assert_eq!(canonical("2023-10-01").as_deref(), Some("2023-10-01"));
    }

    #[test]
    fn day_month_name_two_digit_year() {
        assert_eq!(canonical("22-Mar-22").as_deref(), Some("2022-03-22"));
    }

    #[test]
    fn day_month_name_long_forms() {
        assert_eq!(parser().try_parse("5th January 2024"), Some(d(2024, 1, 5)));
        assert_eq!(parser().try_parse("Date: 12 Sept 2023"), Some(d(2023, 9, 12)));
    }

    #[test]
    fn month_name_day_year() {
        assert_eq!(parser().try_parse("March 15, 2024"), Some(d(2024, 3, 15)));
    }

    #[test]
    fn numeric_day_first() {
        assert_eq!(parser().try_parse("03/04/2024"), Some(d(2024, 4, 3)));
        assert_eq!(parser().try_parse("3-4-24"), Some(d(2024, 4, 3)));
        assert_eq!(parser().try_parse("31.12.2023"), Some(d(2023, 12, 31)));
    }

    #[test]
    fn compact_day_month_name() {
        assert_eq!(parser().try_parse("05Jan2024"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn compact_numeric() {
        assert_eq!(parser().try_parse("220322"), Some(d(2022, 3, 22)));
    }

    #[test]
    fn compact_numeric_rejects_invalid_day_month() {
        assert_eq!(parser().try_parse("991399"), None);
        assert_eq!(parser().try_parse("311322"), None);
        // Day and month in range but not a real date.
        assert_eq!(parser().try_parse("310223"), None);
    }

    #[test]
    fn year_pivot_at_fifty() {
        assert_eq!(expand_year(49), 2049);
        assert_eq!(expand_year(50), 1950);
        assert_eq!(parser().try_parse("01-Jan-75"), Some(d(1975, 1, 1)));
    }

    #[test]
    fn relative_tokens() {
        assert_eq!(parser().try_parse("paid yesterday"), Some(d(2024, 6, 14)));
        assert_eq!(parser().try_parse("Last week groceries"), Some(d(2024, 6, 8)));
        assert_eq!(parser().try_parse("lunch today"), Some(d(2024, 6, 15)));
    }

    #[test]
    fn relative_yesterday_crosses_month() {
        let p = DateParser::new(d(2024, 3, 1));
        assert_eq!(p.parse("yesterday"), d(2024, 2, 29));
    }

    #[test]
    fn explicit_parse_ignores_relative_words() {
        assert_eq!(parser().try_parse_explicit("TRANSFER TODAY"), None);
        assert_eq!(parser().try_parse_explicit("05/01/2024"), Some(d(2024, 1, 5)));
    }

    #[test]
    fn parse_defaults_to_today() {
        assert_eq!(parser().parse("no date in here"), d(2024, 6, 15));
        assert_eq!(parser().try_parse("no date in here"), None);
    }

    #[test]
    fn invalid_calendar_dates_are_rejected() {
        assert_eq!(parser().try_parse("2023-02-30"), None);
        assert_eq!(parser().try_parse("31/04/2024"), None);
    }

    #[test]
    fn month_names() {
        assert_eq!(month_from_name("Sep"), Some(9));
        assert_eq!(month_from_name("SEPTEMBER"), Some(9));
        assert_eq!(month_from_name("ma"), None);
        assert_eq!(month_from_name("items"), None);
    }
}
