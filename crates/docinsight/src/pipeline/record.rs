use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::processor::{ContentCategory, ExtractionResult};

/// Step-log entry recorded once analysis has run.
pub const STEP_NLP_ANALYSIS: &str = "nlp_analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline run.
///
/// Only the pipeline mutates a record, and only while it is `processing`.
/// Once it reaches `completed` or `failed` it is handed out read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingRecord {
    file_path: PathBuf,
    content_category: ContentCategory,
    status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisResult>,
    steps_completed: Vec<String>,
    errors: Vec<String>,
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl ProcessingRecord {
    /// Starts a run; the record goes straight from pending to processing.
    pub(crate) fn begin(file_path: &Path, content_category: ContentCategory) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
            content_category,
            status: ProcessingStatus::Processing,
            extraction: None,
            analysis: None,
            steps_completed: Vec::new(),
            errors: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub(crate) fn set_extraction(&mut self, extraction: ExtractionResult) {
        debug_assert_eq!(self.status, ProcessingStatus::Processing);
        self.extraction = Some(extraction);
    }

    pub(crate) fn set_analysis(&mut self, analysis: AnalysisResult) {
        debug_assert_eq!(self.status, ProcessingStatus::Processing);
        self.analysis = Some(analysis);
    }

    pub(crate) fn complete_step(&mut self, step: &str) {
        debug_assert_eq!(self.status, ProcessingStatus::Processing);
        self.steps_completed.push(step.to_string());
    }

    pub(crate) fn push_error(&mut self, error: String) {
        debug_assert_eq!(self.status, ProcessingStatus::Processing);
        self.errors.push(error);
    }

    /// Moves the record into a terminal status. Only `processing` may transition.
    pub(crate) fn finish(mut self, status: ProcessingStatus) -> Self {
        debug_assert!(status.is_terminal());
        if self.status == ProcessingStatus::Processing && status.is_terminal() {
            self.status = status;
            self.completed_at = Some(Utc::now());
        }
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn content_category(&self) -> ContentCategory {
        self.content_category
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn steps_completed(&self) -> &[String] {
        &self.steps_completed
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extraction.as_ref().map(|e| e.text.as_str())
    }

    pub fn confidence_score(&self) -> Option<f64> {
        self.extraction
            .as_ref()
            .filter(|e| !e.is_error())
            .map(|e| e.confidence)
    }

    pub fn processing_time(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_is_processing() {
        let record = ProcessingRecord::begin(Path::new("/tmp/a.txt"), ContentCategory::Text);
        assert_eq!(record.status(), ProcessingStatus::Processing);
        assert!(record.steps_completed().is_empty());
        assert!(record.completed_at().is_none());
    }

    #[test]
    fn test_finish_sets_completion_time() {
        let record = ProcessingRecord::begin(Path::new("/tmp/a.txt"), ContentCategory::Text)
            .finish(ProcessingStatus::Completed);

        assert_eq!(record.status(), ProcessingStatus::Completed);
        assert!(record.completed_at().unwrap() >= record.started_at());
        assert!(record.processing_time().is_some());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            ProcessingStatus::Pending,
            ProcessingStatus::Processing,
            ProcessingStatus::Completed,
            ProcessingStatus::Failed,
        ] {
            assert_eq!(ProcessingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProcessingStatus::parse("ignored"), None);
    }

    #[test]
    fn test_serializes_status_lowercase() {
        let record = ProcessingRecord::begin(Path::new("/tmp/a.png"), ContentCategory::Image)
            .finish(ProcessingStatus::Failed);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["content_category"], "image");
        assert!(json.get("analysis").is_none());
    }
}
