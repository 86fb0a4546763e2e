pub mod image;
pub mod ocr;
pub mod text;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::OcrConfig;
use crate::error::ExtractionError;
use crate::sanitize;

pub use ocr::{OcrEngine, OcrOutput, TesseractEngine};

/// Caller-declared kind of input, selecting the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Image,
    Text,
}

impl ContentCategory {
    /// Maps a MIME type to a category. Anything that is not `image/*` is read as text.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.trim().to_ascii_lowercase().starts_with("image/") {
            Self::Image
        } else {
            Self::Text
        }
    }

    /// Guesses the category from the file extension when the caller has no MIME type.
    pub fn from_path(path: &Path) -> Self {
        mime_guess::from_path(path)
            .first_raw()
            .map(Self::from_mime)
            .unwrap_or(Self::Text)
    }

    /// Step-log entry recorded when extraction for this category has run.
    pub fn step_name(self) -> &'static str {
        match self {
            Self::Image => "ocr",
            Self::Text => "text_extraction",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the extraction stage.
///
/// When `error` is set, `text` is empty and `confidence` is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    /// Mean per-token OCR confidence (0-100, two decimals); 100 for text files.
    pub confidence: f64,
    pub word_count: usize,
    pub character_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            word_count: 0,
            character_count: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError>;
    fn supports(&self, category: ContentCategory) -> bool;
}

/// Routes a document to the extractor for its content category.
pub struct TextExtractor {
    extractors: Vec<Box<dyn Extractor>>,
}

impl TextExtractor {
    /// Builds the extractor set. Without an OCR engine, image documents are rejected.
    pub fn new(ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        let mut extractors: Vec<Box<dyn Extractor>> = vec![Box::new(text::PlainTextExtractor)];

        if let Some(engine) = ocr {
            extractors.push(Box::new(image::ImageExtractor::new(engine)));
        }

        Self { extractors }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        if config.enabled {
            let engine: Arc<dyn OcrEngine> = Arc::new(TesseractEngine::from_config(config));
            Self::new(Some(engine))
        } else {
            Self::new(None)
        }
    }

    /// Extracts text, folding every failure into [`ExtractionResult::error`].
    pub fn extract(&self, path: &Path, category: ContentCategory) -> ExtractionResult {
        match self.try_extract(path, category) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    file = %sanitize::redact_path(path),
                    category = %category,
                    "Extraction failed: {}",
                    e
                );
                ExtractionResult::failed(e.to_string())
            }
        }
    }

    pub fn try_extract(
        &self,
        path: &Path,
        category: ContentCategory,
    ) -> Result<ExtractionResult, ExtractionError> {
        for extractor in &self.extractors {
            if extractor.supports(category) {
                return extractor.extract(path);
            }
        }

        Err(ExtractionError::UnsupportedCategory(category.to_string()))
    }

    pub fn supports(&self, category: ContentCategory) -> bool {
        self.extractors.iter().any(|e| e.supports(category))
    }
}
