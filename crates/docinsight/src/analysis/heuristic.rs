use crate::error::AnalysisError;

use super::{classifier, entities, sentiment, summary, AnalysisBackend, AnalysisResult};

/// Deterministic analyzer built from keyword, regex and word-list heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn analyze_text(&self, text: &str) -> AnalysisResult {
        AnalysisResult {
            document_type: classifier::classify(text).to_string(),
            key_entities: entities::extract_entities(text),
            summary: summary::summarize(text),
            sentiment_score: sentiment::score(text),
        }
    }
}

impl AnalysisBackend for HeuristicAnalyzer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        Ok(self.analyze_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Great results this quarter, revenue $2.5M, date 2024-01-15";

    #[test]
    fn test_sample_document() {
        let result = HeuristicAnalyzer.analyze_text(SAMPLE);

        assert_eq!(result.document_type, "general_document");
        assert!(result.sentiment_score > 0);
        assert!(result.key_entities.dates.contains("2024-01-15"));
        assert!(result.key_entities.amounts.contains("$2.5"));
        assert!(result.key_entities.names.is_empty());
        assert_eq!(result.summary, SAMPLE);
    }

    #[test]
    fn test_output_is_deterministic() {
        let text = "Report: excellent findings. Contact ops@example.com. Total 12.50. Done.";
        let first = serde_json::to_vec(&HeuristicAnalyzer.analyze_text(text)).unwrap();
        let second = serde_json::to_vec(&HeuristicAnalyzer.analyze_text(text)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_names_never_populated() {
        let result = HeuristicAnalyzer.analyze_text("John Smith signed with Jane Doe on 1/2/2024");
        assert!(result.key_entities.names.is_empty());
    }

    #[test]
    fn test_backend_trait_never_errors() {
        assert!(HeuristicAnalyzer.analyze("").is_ok());
        assert_eq!(HeuristicAnalyzer.name(), "heuristic");
    }
}
