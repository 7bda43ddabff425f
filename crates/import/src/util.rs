use regex::{Captures, Regex};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub(crate) use re;

// ── Ordered (pattern, handler) chains ────────────────────────────────────────

/// One step of a [`PatternChain`]: a named regex plus the handler that turns
/// its captures into a value. Handlers may decline by returning `None`.
pub struct PatternRule<T> {
    pub name: &'static str,
    pub regex: fn() -> &'static Regex,
    pub handler: fn(&Captures<'_>) -> Option<T>,
}

/// An explicit, ordered list of pattern rules evaluated until one yields.
///
/// Every occurrence of a rule's regex is offered to its handler before the
/// chain moves on to the next rule.
pub struct PatternChain<T> {
    rules: Vec<PatternRule<T>>,
}

impl<T> PatternChain<T> {
    pub fn new(rules: Vec<PatternRule<T>>) -> Self {
        Self { rules }
    }

    pub fn first_match(&self, text: &str) -> Option<T> {
        self.first_match_named(text).map(|(_, v)| v)
    }

    /// Like [`first_match`](Self::first_match) but also reports which rule won.
    pub fn first_match_named(&self, text: &str) -> Option<(&'static str, T)> {
        self.rules.iter().find_map(|rule| {
            (rule.regex)()
                .captures_iter(text)
                .find_map(|caps| (rule.handler)(&caps))
                .map(|v| (rule.name, v))
        })
    }
}

/// Lower-cased, whitespace-collapsed copy used for keyword tests.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Whole-word containment on an already lower-cased haystack.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '/')
        .any(|w| w == word)
}

pub fn letter_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Trim punctuation and separators an extractor leaves around a captured name.
pub fn clean_label(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ',' | '.' | ';' | '=' | '|'))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
