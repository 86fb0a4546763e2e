//! Regex-based entity extraction used by the rule-based analyzer.
//!
//! Only dates, amounts and email-like tokens are recognized. Person and
//! organization names need a language model, so `names` stays empty here.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::KeyEntities;

/// `D/D/YY`-style (day or month first) and `YYYY-MM-DD`-style dates, "/" or "-" separated.
pub const DATE_PATTERN: &str = r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b";

/// `$`-prefixed digit groups with optional decimals, or bare two-decimal numbers.
/// Abbreviated forms such as `$2.5M` only match up to the last digit.
pub const AMOUNT_PATTERN: &str = r"\$[\d,]+\.?\d*|\b\d+\.\d{2}\b";

pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_PATTERN).expect("date pattern is valid"));
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(AMOUNT_PATTERN).expect("amount pattern is valid"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));

pub fn extract_entities(text: &str) -> KeyEntities {
    KeyEntities {
        names: BTreeSet::new(),
        dates: find_all(&DATE_RE, text),
        amounts: find_all(&AMOUNT_RE, text),
        other: find_all(&EMAIL_RE, text),
    }
}

fn find_all(re: &Regex, text: &str) -> BTreeSet<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
