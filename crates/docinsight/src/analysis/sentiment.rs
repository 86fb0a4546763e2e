//! Bag-of-words polarity scoring.

pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "positive",
    "success",
    "happy",
    "pleased",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "negative",
    "failure",
    "unhappy",
    "disappointed",
    "problem",
];

/// Points per net keyword occurrence.
const WEIGHT: i64 = 20;

pub const MAX_SCORE: i32 = 100;
pub const MIN_SCORE: i32 = -100;

/// Scores text in `[-100, 100]` from case-insensitive substring occurrences.
pub fn score(text: &str) -> i32 {
    let text_lower = text.to_lowercase();
    let positive = count_occurrences(&text_lower, POSITIVE_WORDS);
    let negative = count_occurrences(&text_lower, NEGATIVE_WORDS);

    let raw = (positive as i64 - negative as i64).saturating_mul(WEIGHT);
    clamp(raw)
}

/// Clamps any score into `[-100, 100]`.
pub fn clamp(raw: i64) -> i32 {
    raw.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as i32
}

fn count_occurrences(text_lower: &str, words: &[&str]) -> usize {
    words.iter().map(|w| text_lower.matches(w).count()).sum()
}
