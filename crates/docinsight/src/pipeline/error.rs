use thiserror::Error;

/// Reasons a run ends in the `failed` state. The display text is what lands in the record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("{0}")]
    TextExtraction(String),

    #[error("No text extracted from document")]
    NoText,
}
