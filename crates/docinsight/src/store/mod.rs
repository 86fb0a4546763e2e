//! Bookkeeping for registered documents and their latest processing outcome.

pub mod memory;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, KeyEntities};
use crate::error::StoreError;
use crate::pipeline::{ProcessingRecord, ProcessingStatus};

pub use memory::MemoryDocumentStore;

/// Page size used by [`DocumentFilter`] when none is given.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Describes an incoming document before it is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub filename: String,
    pub file_path: PathBuf,
    pub file_size: u64,
    pub mime_type: String,
}

impl DocumentMeta {
    /// Reads size from the filesystem and guesses the MIME type unless one is given.
    pub fn from_path(path: PathBuf, mime_type: Option<String>) -> std::io::Result<Self> {
        let file_size = std::fs::metadata(&path)?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let mime_type = mime_type.unwrap_or_else(|| {
            mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string()
        });

        Ok(Self {
            filename,
            file_path: path,
            file_size,
            mime_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub filename: String,
    pub file_path: PathBuf,
    pub file_size: u64,
    pub mime_type: String,
    pub status: ProcessingStatus,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
    pub extracted_text: Option<String>,
    pub confidence_score: Option<f64>,
    pub analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub(crate) fn register(id: String, meta: DocumentMeta) -> Self {
        let now = Utc::now();
        Self {
            id,
            filename: meta.filename,
            file_path: meta.file_path,
            file_size: meta.file_size,
            mime_type: meta.mime_type,
            status: ProcessingStatus::Pending,
            processing_started_at: None,
            processing_completed_at: None,
            extracted_text: None,
            confidence_score: None,
            analysis: None,
            errors: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn mark_processing(&mut self) {
        let now = Utc::now();
        self.status = ProcessingStatus::Processing;
        self.processing_started_at = Some(now);
        self.processing_completed_at = None;
        self.updated_at = now;
    }

    /// Copies the outcome of a finished run. Content is kept only for completed runs.
    pub(crate) fn apply_record(&mut self, record: &ProcessingRecord) {
        self.status = record.status();
        self.processing_started_at = Some(record.started_at());
        self.processing_completed_at = record.completed_at();
        self.errors = record.errors().to_vec();

        if record.status() == ProcessingStatus::Completed {
            self.extracted_text = record.extracted_text().map(str::to_string);
            self.confidence_score = record.confidence_score();
            self.analysis = record.analysis().cloned();
        } else {
            self.extracted_text = None;
            self.confidence_score = None;
            self.analysis = None;
        }
        self.updated_at = Utc::now();
    }

    pub fn processing_time_secs(&self) -> Option<f64> {
        match (self.processing_started_at, self.processing_completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }

    pub fn results(&self) -> DocumentResults {
        match (self.status, &self.analysis) {
            (ProcessingStatus::Completed, Some(analysis)) => {
                DocumentResults::Completed(CompletedResults {
                    document_id: self.id.clone(),
                    status: self.status,
                    extracted_text: self.extracted_text.clone(),
                    confidence_score: self.confidence_score,
                    document_type: analysis.document_type.clone(),
                    key_entities: analysis.key_entities.clone(),
                    summary: analysis.summary.clone(),
                    sentiment_score: analysis.sentiment_score,
                    processing_time_secs: self.processing_time_secs(),
                })
            }
            _ => DocumentResults::NotCompleted {
                status: self.status,
                message: "Document processing not completed yet".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedResults {
    pub document_id: String,
    pub status: ProcessingStatus,
    pub extracted_text: Option<String>,
    pub confidence_score: Option<f64>,
    pub document_type: String,
    pub key_entities: KeyEntities,
    pub summary: String,
    pub sentiment_score: i32,
    pub processing_time_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentResults {
    Completed(CompletedResults),
    NotCompleted {
        status: ProcessingStatus,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    pub status: Option<ProcessingStatus>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            status: None,
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl DocumentFilter {
    pub fn with_status(status: ProcessingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

pub trait DocumentStore: Send + Sync {
    /// Registers a document in the `pending` state.
    fn register(&self, meta: DocumentMeta) -> Result<StoredDocument, StoreError>;

    fn mark_processing(&self, id: &str) -> Result<(), StoreError>;

    fn apply_record(
        &self,
        id: &str,
        record: &ProcessingRecord,
    ) -> Result<StoredDocument, StoreError>;

    fn get(&self, id: &str) -> Result<StoredDocument, StoreError>;

    /// Lists documents in registration order.
    fn list(&self, filter: &DocumentFilter) -> Vec<StoredDocument>;

    /// Forgets a document. The file on disk is left alone.
    fn delete(&self, id: &str) -> Result<StoredDocument, StoreError>;

    fn results(&self, id: &str) -> Result<DocumentResults, StoreError> {
        self.get(id).map(|doc| doc.results())
    }
}
