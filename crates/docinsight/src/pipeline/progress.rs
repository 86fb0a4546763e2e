//! Progress reporting for pipeline runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Phase of document processing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPhase {
    Queued,
    Extracting,
    Analyzing,
    Completed,
    Failed,
}

impl std::fmt::Display for ProcessingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingPhase::Queued => write!(f, "Queued"),
            ProcessingPhase::Extracting => write!(f, "Extracting text"),
            ProcessingPhase::Analyzing => write!(f, "Analyzing"),
            ProcessingPhase::Completed => write!(f, "Completed"),
            ProcessingPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Events emitted by the pipeline during processing.
/// Extracted text is never included.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Phase {
        phase: ProcessingPhase,
        message: String,
    },
    Completed {
        document_type: String,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Reporter that drops every event.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Progress event as published to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProgressEvent {
    pub document_id: String,
    pub filename: String,
    pub phase: ProcessingPhase,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentProgressEvent {
    pub fn new(document_id: &str, filename: &str, phase: ProcessingPhase, message: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            filename: filename.to_string(),
            phase,
            message: message.to_string(),
            timestamp: Utc::now(),
            document_type: None,
            error: None,
        }
    }
}

/// Bridges pipeline events onto a broadcast channel for one document.
pub struct BroadcastProgress {
    document_id: String,
    filename: String,
    sender: Arc<broadcast::Sender<DocumentProgressEvent>>,
}

impl BroadcastProgress {
    pub fn new(
        document_id: &str,
        filename: &str,
        sender: Arc<broadcast::Sender<DocumentProgressEvent>>,
    ) -> Self {
        Self {
            document_id: document_id.to_string(),
            filename: filename.to_string(),
            sender,
        }
    }

    fn send(&self, event: DocumentProgressEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        let message = match event {
            ProgressEvent::Phase { phase, message } => {
                DocumentProgressEvent::new(&self.document_id, &self.filename, phase, &message)
            }
            ProgressEvent::Completed { document_type } => {
                let mut e = DocumentProgressEvent::new(
                    &self.document_id,
                    &self.filename,
                    ProcessingPhase::Completed,
                    "Processing completed",
                );
                e.document_type = Some(document_type);
                e
            }
            ProgressEvent::Failed { error } => {
                let mut e = DocumentProgressEvent::new(
                    &self.document_id,
                    &self.filename,
                    ProcessingPhase::Failed,
                    "Processing failed",
                );
                e.error = Some(error);
                e
            }
        };
        self.send(message);
    }
}
