use std::path::Path;
use std::sync::Arc;

use crate::error::ExtractionError;
use crate::processor::ocr::{self, OcrEngine};
use crate::processor::{ContentCategory, ExtractionResult, Extractor};

pub struct ImageExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl ImageExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

impl Extractor for ImageExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let _span = tracing::info_span!("extractor.image").entered();

        let image_data = std::fs::read(path).map_err(|e| ExtractionError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let png = ocr::prepare_image(&image_data)?;
        let output = self.engine.recognize(&png)?;

        let text = output.text.trim().to_string();
        let confidence = ocr::mean_confidence(&output.token_confidences);

        tracing::debug!(
            tokens = output.token_confidences.len(),
            confidence,
            "OCR finished"
        );

        Ok(ExtractionResult {
            word_count: text.split_whitespace().count(),
            character_count: text.chars().count(),
            confidence,
            text,
            error: None,
        })
    }

    fn supports(&self, category: ContentCategory) -> bool {
        matches!(category, ContentCategory::Image)
    }
}
