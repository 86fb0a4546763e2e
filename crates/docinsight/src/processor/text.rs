use std::path::Path;

use crate::error::ExtractionError;
use crate::processor::{ContentCategory, ExtractionResult, Extractor};

/// Confidence reported for documents that were read rather than recognized.
pub const TEXT_CONFIDENCE: f64 = 100.0;

/// Reads plain-text documents verbatim. No trimming or normalization is applied.
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let _span = tracing::info_span!("extractor.text").entered();

        let bytes = std::fs::read(path).map_err(|e| ExtractionError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let text = String::from_utf8(bytes).map_err(|e| ExtractionError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(ExtractionResult {
            word_count: text.split_whitespace().count(),
            character_count: text.chars().count(),
            confidence: TEXT_CONFIDENCE,
            text,
            error: None,
        })
    }

    fn supports(&self, category: ContentCategory) -> bool {
        matches!(category, ContentCategory::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_text_is_returned_verbatim() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "  Hello, World!\nThis is a test document.\n\n").unwrap();

        let result = PlainTextExtractor.extract(temp_file.path()).unwrap();

        assert_eq!(result.text, "  Hello, World!\nThis is a test document.\n\n");
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.word_count, 7);
        assert_eq!(result.character_count, 42);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_character_count_is_in_chars_not_bytes() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "Größe").unwrap();

        let result = PlainTextExtractor.extract(temp_file.path()).unwrap();
        assert_eq!(result.character_count, 5);
    }

    #[test]
    fn test_empty_file_yields_empty_text() {
        let temp_file = NamedTempFile::new().unwrap();

        let result = PlainTextExtractor.extract(temp_file.path()).unwrap();
        assert!(result.text.is_empty());
        assert_eq!(result.word_count, 0);
        assert_eq!(result.confidence, 100.0);
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&[0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let result = PlainTextExtractor.extract(temp_file.path());
        assert!(matches!(result, Err(ExtractionError::Decode { .. })));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = PlainTextExtractor.extract(Path::new("/nonexistent/notes.txt"));
        match result {
            Err(ExtractionError::ReadDocument { path, .. }) => {
                assert_eq!(path.to_str().unwrap(), "/nonexistent/notes.txt");
            }
            other => panic!("Expected ReadDocument error, got {:?}", other),
        }
    }

    #[test]
    fn test_supports_only_text() {
        assert!(PlainTextExtractor.supports(ContentCategory::Text));
        assert!(!PlainTextExtractor.supports(ContentCategory::Image));
    }
}
