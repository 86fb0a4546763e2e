#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use docinsight::analysis::{ChatBackend, ChatRequest};
use docinsight::error::{AnalysisError, ExtractionError};
use docinsight::processor::{OcrEngine, OcrOutput};

/// OCR engine that returns a fixed answer for every image.
pub struct ScriptedOcr {
    output: Result<OcrOutput, String>,
}

impl ScriptedOcr {
    pub fn text(text: &str, confidences: &[i32]) -> Self {
        Self {
            output: Ok(OcrOutput {
                text: text.to_string(),
                token_confidences: confidences.to_vec(),
            }),
        }
    }

    pub fn blank() -> Self {
        Self::text("", &[])
    }

    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
        }
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, _png: &[u8]) -> Result<OcrOutput, ExtractionError> {
        self.output.clone().map_err(ExtractionError::OcrFailed)
    }
}

/// Chat backend that replays one reply and records every request.
pub struct ScriptedChat {
    reply: Result<String, String>,
    pub requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedChat {
    pub fn replying(body: &str) -> Self {
        Self {
            reply: Ok(body.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ChatBackend for ScriptedChat {
    fn complete(&self, request: &ChatRequest) -> Result<String, AnalysisError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(AnalysisError::Request)
    }
}
