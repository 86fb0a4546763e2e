use std::path::{Path, PathBuf};

use crate::pipeline::{ProcessingRecord, ProcessingStatus};
use crate::processor::ContentCategory;

#[derive(Debug, Clone)]
pub struct Job {
    /// Document identifier; at most one job per id runs at a time.
    pub document_id: String,
    pub source_path: PathBuf,
    pub content_category: ContentCategory,
    /// MIME type of the source file (e.g., "image/png", "text/plain").
    pub mime_type: Option<String>,
}

impl Job {
    fn new_internal(document_id: String, source_path: PathBuf, mime_type: Option<String>) -> Self {
        let mime_type = mime_type.or_else(|| Self::detect_mime_type(&source_path));
        let content_category = mime_type
            .as_deref()
            .map(ContentCategory::from_mime)
            .unwrap_or(ContentCategory::Text);
        Self {
            document_id,
            source_path,
            content_category,
            mime_type,
        }
    }

    /// Creates a job under a fresh document id, detecting the MIME type from the path.
    pub fn new(source_path: PathBuf) -> Self {
        Self::new_internal(uuid::Uuid::new_v4().to_string(), source_path, None)
    }

    /// Creates a job for an already-registered document.
    pub fn for_document(document_id: &str, source_path: PathBuf, mime_type: Option<String>) -> Self {
        Self::new_internal(document_id.to_string(), source_path, mime_type)
    }

    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

#[derive(Debug)]
pub struct JobResult {
    pub document_id: String,
    pub record: ProcessingRecord,
}

impl JobResult {
    pub fn success(&self) -> bool {
        self.record.status() == ProcessingStatus::Completed
    }
}
