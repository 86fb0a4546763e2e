use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocInsightError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to resolve analysis credential: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported content category: {0}")]
    UnsupportedCategory(String),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{path}' is not valid UTF-8: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to process image: {0}")]
    ImageProcessing(String),

    #[error("OCR engine error: {0}")]
    OcrFailed(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis request failed: {0}")]
    Request(String),

    #[error("Analysis backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis backend returned an empty response")]
    EmptyResponse,

    #[error("Failed to parse analysis response: {0}")]
    ResponseParse(String),

    #[error("Invalid analysis field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,

    #[error("Document {0} is already queued or running")]
    AlreadyRunning(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document {id} is too large: {size} bytes (maximum {max})")]
    TooLarge { id: String, size: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, DocInsightError>;
