use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::AnalysisError;
use crate::sanitize;

use super::backend::{ChatBackend, ChatMessage, ChatRequest};
use super::{
    sentiment, AnalysisBackend, AnalysisResult, AnalysisSettings, KeyEntities, DOCUMENT_TYPES,
    UNKNOWN_DOCUMENT_TYPE,
};

pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert document analyst. Always respond with valid JSON.";

/// Exactly the four fields the prompt asks for; anything else is rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireAnalysis {
    document_type: String,
    key_entities: WireEntities,
    summary: String,
    sentiment_score: f64,
}

#[derive(Deserialize)]
struct WireEntities {
    #[serde(default)]
    names: Vec<Value>,
    #[serde(default)]
    dates: Vec<Value>,
    #[serde(default)]
    amounts: Vec<Value>,
    #[serde(default)]
    other: Vec<Value>,
}

/// Analyzer backed by a chat-completion model.
pub struct RemoteAnalyzer {
    chat: Box<dyn ChatBackend>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompt_char_limit: usize,
}

impl RemoteAnalyzer {
    pub fn new(chat: Box<dyn ChatBackend>, settings: &AnalysisSettings) -> Self {
        Self {
            chat,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            prompt_char_limit: settings.prompt_char_limit,
        }
    }

    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(build_prompt(text, self.prompt_char_limit)),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl AnalysisBackend for RemoteAnalyzer {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let request = self.build_request(text);
        let response = self.chat.complete(&request)?;
        debug!("Analysis response: {}", sanitize::preview(&response, 200));

        parse_response(&response)
    }
}

/// Builds the user prompt from at most `char_limit` leading characters of `text`.
pub fn build_prompt(text: &str, char_limit: usize) -> String {
    let excerpt: String = text.chars().take(char_limit).collect();

    format!(
        r#"Analyze the following document and provide:
1. Document type (invoice, contract, report, resume, or general_document)
2. Key entities (names, dates, amounts, other)
3. Summary (2-3 sentences)
4. Sentiment score (-100 to 100)

Document text:
{excerpt}

Respond in JSON format with exactly these fields:
{{
    "document_type": "string",
    "key_entities": {{"names": [], "dates": [], "amounts": [], "other": []}},
    "summary": "string",
    "sentiment_score": number
}}"#
    )
}

/// Parses a backend answer strictly as the four-field JSON object.
pub fn parse_response(response: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let wire: WireAnalysis = serde_json::from_str(trimmed)
        .map_err(|e| AnalysisError::ResponseParse(e.to_string()))?;

    Ok(AnalysisResult {
        document_type: normalize_document_type(&wire.document_type),
        key_entities: KeyEntities {
            names: entity_values("names", wire.key_entities.names)?,
            dates: entity_values("dates", wire.key_entities.dates)?,
            amounts: entity_values("amounts", wire.key_entities.amounts)?,
            other: entity_values("other", wire.key_entities.other)?,
        },
        summary: wire.summary,
        sentiment_score: sentiment::clamp(wire.sentiment_score.round() as i64),
    })
}

fn normalize_document_type(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
    if DOCUMENT_TYPES.contains(&normalized.as_str()) {
        normalized
    } else {
        UNKNOWN_DOCUMENT_TYPE.to_string()
    }
}

fn entity_values(field: &'static str, values: Vec<Value>) -> Result<BTreeSet<String>, AnalysisError> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => {
                let s = s.trim().to_string();
                (!s.is_empty()).then_some(Ok(s))
            }
            Value::Number(n) => Some(Ok(n.to_string())),
            Value::Null => None,
            other => Some(Err(AnalysisError::InvalidField {
                field,
                reason: format!("expected string values, found {}", other),
            })),
        })
        .collect()
}
