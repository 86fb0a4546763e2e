//! Keyword-driven document type detection.

/// Returned when no keyword group matches.
pub const GENERAL_DOCUMENT: &str = "general_document";

/// Keyword groups in priority order. The first group with any keyword
/// contained in the lower-cased text decides the type.
pub const DOCUMENT_TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("invoice", &["invoice", "bill", "payment", "amount due"]),
    ("contract", &["contract", "agreement", "terms", "conditions"]),
    ("report", &["report", "analysis", "findings", "conclusion"]),
    ("resume", &["resume", "cv", "curriculum vitae", "experience"]),
];

pub fn classify(text: &str) -> &'static str {
    let text_lower = text.to_lowercase();

    DOCUMENT_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(document_type, _)| *document_type)
        .unwrap_or(GENERAL_DOCUMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_maps_to_its_type() {
        for (document_type, keywords) in DOCUMENT_TYPE_KEYWORDS {
            for keyword in *keywords {
                let text = format!("Please see the {} attached", keyword.to_uppercase());
                assert_eq!(classify(&text), *document_type, "keyword '{}'", keyword);
            }
        }
    }

    #[test]
    fn test_invoice_wins_over_contract() {
        assert_eq!(
            classify("This contract covers the invoice schedule"),
            "invoice"
        );
    }

    #[test]
    fn test_contract_wins_over_report() {
        assert_eq!(classify("Findings under the agreement"), "contract");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("ANNUAL REPORT 2024"), "report");
    }

    #[test]
    fn test_substring_membership() {
        // "cv" inside another word still counts
        assert_eq!(classify("See the cvs pharmacy receipt"), "resume");
    }

    #[test]
    fn test_no_keywords_is_general_document() {
        assert_eq!(classify("Great results this quarter"), GENERAL_DOCUMENT);
        assert_eq!(classify(""), GENERAL_DOCUMENT);
    }
}
