use std::io::Cursor;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::OcrConfig;
use crate::error::ExtractionError;

/// Word-level confidence attribute emitted by Tesseract's hOCR renderer.
static HOCR_WORD_CONFIDENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class=['"]ocrx_word['"][^>]*?title=['"][^'"]*?x_wconf (-?\d+)"#)
        .expect("hOCR confidence pattern is valid")
});

/// Recognized text plus per-token confidences (0-100, negative for non-words).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub token_confidences: Vec<i32>,
}

/// Recognizes text in a PNG-encoded RGB image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, png: &[u8]) -> Result<OcrOutput, ExtractionError>;
}

#[derive(Clone)]
pub struct TesseractEngine {
    inner: Arc<TesseractEngineInner>,
}

struct TesseractEngineInner {
    languages: String,
    page_segmentation_mode: u8,
    dpi: u32,
}

impl TesseractEngine {
    pub fn new(languages: &[String], page_segmentation_mode: u8, dpi: u32) -> Self {
        let lang_str = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self {
            inner: Arc::new(TesseractEngineInner {
                languages: lang_str,
                page_segmentation_mode,
                dpi,
            }),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(&config.languages, config.page_segmentation_mode, config.dpi)
    }

    pub fn languages(&self) -> &str {
        &self.inner.languages
    }

    pub fn dpi(&self) -> u32 {
        self.inner.dpi
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, png: &[u8]) -> Result<OcrOutput, ExtractionError> {
        let _span = tracing::info_span!("processor.ocr", languages = %self.inner.languages).entered();

        let mut lt = leptess::LepTess::new(None, &self.inner.languages).map_err(|e| {
            ExtractionError::OcrFailed(format!("Failed to initialize Tesseract: {}", e))
        })?;

        lt.set_variable(
            leptess::Variable::TesseditPagesegMode,
            &self.inner.page_segmentation_mode.to_string(),
        )
        .map_err(|e| {
            ExtractionError::OcrFailed(format!("Failed to set page segmentation mode: {:?}", e))
        })?;

        lt.set_image_from_mem(png)
            .map_err(|e| ExtractionError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;
        lt.set_fallback_source_resolution(self.inner.dpi as i32);

        let text = lt
            .get_utf8_text()
            .map_err(|e| ExtractionError::OcrFailed(format!("Text recognition failed: {}", e)))?;

        // Reuses the recognition pass from get_utf8_text
        let hocr = lt
            .get_hocr_text(0)
            .map_err(|e| ExtractionError::OcrFailed(format!("hOCR rendering failed: {}", e)))?;

        Ok(OcrOutput {
            text,
            token_confidences: parse_hocr_confidences(&hocr),
        })
    }
}

/// Decodes an image, normalizes it to 8-bit RGB, and re-encodes it as PNG for the engine.
pub fn prepare_image(image_data: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Failed to load image: {}", e)))?;

    let rgb = if matches!(img, image::DynamicImage::ImageRgb8(_)) {
        img
    } else {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut png_data = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("Failed to convert image: {}", e)))?;

    Ok(png_data)
}

pub fn parse_hocr_confidences(hocr: &str) -> Vec<i32> {
    HOCR_WORD_CONFIDENCE
        .captures_iter(hocr)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// Mean of the strictly positive confidences, rounded to two decimals; 0 when there are none.
pub fn mean_confidence(confidences: &[i32]) -> f64 {
    let positive: Vec<f64> = confidences
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| f64::from(c))
        .collect();

    if positive.is_empty() {
        return 0.0;
    }

    let mean = positive.iter().sum::<f64>() / positive.len() as f64;
    (mean * 100.0).round() / 100.0
}
