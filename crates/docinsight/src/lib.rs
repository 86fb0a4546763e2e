pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod secrets;
pub mod store;
pub mod worker;

pub use analysis::{AnalysisEngine, AnalysisResult, AnalysisSettings, KeyEntities};
pub use config::{load_config, load_config_from_str, Config};
pub use error::{
    AnalysisError, ConfigError, DocInsightError, ExtractionError, Result, StoreError, WorkerError,
};
pub use pipeline::{Pipeline, PipelineConfig, ProcessingRecord, ProcessingStatus};
pub use processor::{ContentCategory, ExtractionResult, TextExtractor};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use store::{DocumentFilter, DocumentMeta, DocumentStore, MemoryDocumentStore, StoredDocument};
pub use worker::{Job, JobResult, WorkerPool};
