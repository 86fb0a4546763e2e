/// Characters kept when the text has too few sentences to summarize.
pub const SUMMARY_CHAR_LIMIT: usize = 200;

/// Naive summary: the first two "."-delimited segments when there are more
/// than three, otherwise the leading 200 characters.
pub fn summarize(text: &str) -> String {
    let segments: Vec<&str> = text.split('.').collect();
    if segments.len() > 3 {
        return format!("{}.", segments[..2].join(". "));
    }

    if text.chars().count() > SUMMARY_CHAR_LIMIT {
        let head: String = text.chars().take(SUMMARY_CHAR_LIMIT).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
