//! Document analysis: document type, key entities, summary and sentiment.
//!
//! Two [`AnalysisBackend`] implementations exist. [`RemoteAnalyzer`] asks a
//! chat-completion model for a strict JSON answer; [`HeuristicAnalyzer`] is a
//! deterministic rule-based analyzer with no I/O. [`AnalysisEngine`] picks one
//! at construction time and always keeps the heuristic analyzer around as the
//! fallback, so [`AnalysisEngine::analyze`] cannot fail.

pub mod backend;
pub mod classifier;
pub mod entities;
pub mod heuristic;
pub mod remote;
pub mod sentiment;
pub mod summary;

use std::collections::BTreeSet;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, ConfigError};
use crate::secrets;

pub use backend::{ChatBackend, ChatMessage, ChatRequest, OpenAiChatBackend};
pub use heuristic::HeuristicAnalyzer;
pub use remote::RemoteAnalyzer;

/// Document type reported when a backend answer is outside [`DOCUMENT_TYPES`].
pub const UNKNOWN_DOCUMENT_TYPE: &str = "unknown";

/// Vocabulary of document types a result may carry (besides "unknown").
pub const DOCUMENT_TYPES: &[&str] = &[
    "invoice",
    "contract",
    "report",
    "resume",
    classifier::GENERAL_DOCUMENT,
];

/// Entity values grouped by category. All four categories are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntities {
    pub names: BTreeSet<String>,
    pub dates: BTreeSet<String>,
    pub amounts: BTreeSet<String>,
    pub other: BTreeSet<String>,
}

impl KeyEntities {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.dates.is_empty()
            && self.amounts.is_empty()
            && self.other.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub document_type: String,
    pub key_entities: KeyEntities,
    pub summary: String,
    /// Always within `[-100, 100]`.
    pub sentiment_score: i32,
}

pub trait AnalysisBackend: Send + Sync {
    /// Short label for logs and health output.
    fn name(&self) -> &'static str;

    fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// Resolved analysis settings injected into [`AnalysisEngine`].
#[derive(Debug)]
pub struct AnalysisSettings {
    pub backend_enabled: bool,
    pub credential: Option<SecretString>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub prompt_char_limit: usize,
}

impl AnalysisSettings {
    /// Resolves the credential sources named in `config`.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let credential = if config.enabled {
            if !secrets::has_secret_source(
                config.api_key.as_deref(),
                config.api_key_file.as_deref(),
                config.api_key_env_var.as_deref(),
            ) {
                debug!("No analysis credential source configured");
            }
            secrets::resolve_secret_optional(
                config.api_key.as_deref(),
                config.api_key_file.as_deref(),
                config.api_key_env_var.as_deref(),
            )?
        } else {
            None
        };

        Ok(Self::with_credential(config, credential))
    }

    /// Builds settings from `config` with an explicit credential, bypassing secret lookup.
    pub fn with_credential(config: &AnalysisConfig, credential: Option<SecretString>) -> Self {
        Self {
            backend_enabled: config.enabled,
            credential,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
            prompt_char_limit: config.prompt_char_limit,
        }
    }

    /// Settings that always select the rule-based analyzer.
    pub fn fallback_only() -> Self {
        Self::with_credential(&AnalysisConfig::disabled(), None)
    }

    pub fn uses_remote(&self) -> bool {
        self.backend_enabled && self.credential.is_some()
    }
}

pub struct AnalysisEngine {
    backend: Box<dyn AnalysisBackend>,
    fallback: HeuristicAnalyzer,
}

impl AnalysisEngine {
    /// Selects the remote analyzer when a backend is enabled and a credential
    /// resolved; otherwise the rule-based analyzer. No network call is made here.
    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        let backend: Box<dyn AnalysisBackend> = match &settings.credential {
            Some(credential) if settings.backend_enabled => {
                let chat =
                    OpenAiChatBackend::new(&settings.endpoint, credential.clone(), settings.timeout);
                match chat {
                    Ok(chat) => Box::new(RemoteAnalyzer::new(Box::new(chat), settings)),
                    Err(e) => {
                        warn!("Remote analysis unavailable, using rule-based analysis: {}", e);
                        Box::new(HeuristicAnalyzer)
                    }
                }
            }
            _ => Box::new(HeuristicAnalyzer),
        };

        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Box<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            fallback: HeuristicAnalyzer,
        }
    }

    pub fn mode(&self) -> &'static str {
        self.backend.name()
    }

    /// Analyzes `text`. Backend failures are logged and answered by the rule-based analyzer.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let _span = info_span!("analysis", backend = self.backend.name()).entered();

        match self.backend.analyze(text) {
            Ok(result) => result,
            Err(e) => {
                warn!("Analysis via {} failed, falling back: {}", self.backend.name(), e);
                let result = self.fallback.analyze_text(text);
                debug!(document_type = %result.document_type, "Fallback analysis finished");
                result
            }
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::with_backend(Box::new(HeuristicAnalyzer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBackend;

    impl AnalysisBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn analyze(&self, _text: &str) -> Result<AnalysisResult, AnalysisError> {
            Err(AnalysisError::Request("connection refused".to_string()))
        }
    }

    struct CannedBackend;

    impl AnalysisBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn analyze(&self, _text: &str) -> Result<AnalysisResult, AnalysisError> {
            Ok(AnalysisResult {
                document_type: "contract".to_string(),
                key_entities: KeyEntities {
                    names: ["Acme Corp".to_string()].into_iter().collect(),
                    ..KeyEntities::default()
                },
                summary: "A services agreement.".to_string(),
                sentiment_score: 10,
            })
        }
    }

    #[test]
    fn test_fallback_only_settings_select_heuristic() {
        let engine = AnalysisEngine::from_settings(&AnalysisSettings::fallback_only());
        assert_eq!(engine.mode(), "heuristic");
    }

    #[test]
    fn test_enabled_without_credential_selects_heuristic() {
        let settings = AnalysisSettings::with_credential(&AnalysisConfig::default(), None);
        assert!(!settings.uses_remote());
        assert_eq!(AnalysisEngine::from_settings(&settings).mode(), "heuristic");
    }

    #[test]
    fn test_disabled_with_credential_selects_heuristic() {
        let settings = AnalysisSettings::with_credential(
            &AnalysisConfig::disabled(),
            Some(SecretString::from("sk-test")),
        );
        assert!(!settings.uses_remote());
        assert_eq!(AnalysisEngine::from_settings(&settings).mode(), "heuristic");
    }

    #[test]
    fn test_enabled_with_credential_selects_remote() {
        let settings = AnalysisSettings::with_credential(
            &AnalysisConfig::default(),
            Some(SecretString::from("sk-test")),
        );
        assert!(settings.uses_remote());
        assert_eq!(AnalysisEngine::from_settings(&settings).mode(), "remote");
    }

    #[test]
    fn test_remote_engine_leaves_settings_credential_intact() {
        use secrecy::ExposeSecret;

        let settings = AnalysisSettings::with_credential(
            &AnalysisConfig::default(),
            Some(SecretString::from("sk-test")),
        );
        let first = AnalysisEngine::from_settings(&settings);
        let second = AnalysisEngine::from_settings(&settings);

        assert_eq!(first.mode(), "remote");
        assert_eq!(second.mode(), "remote");
        let credential = settings.credential.as_ref().unwrap();
        assert_eq!(credential.expose_secret(), "sk-test");
    }

    #[test]
    fn test_settings_from_disabled_config_skip_secret_lookup() {
        let config = AnalysisConfig {
            enabled: false,
            api_key_file: Some("/nonexistent/key".to_string()),
            ..AnalysisConfig::default()
        };
        let settings = AnalysisSettings::from_config(&config).unwrap();
        assert!(settings.credential.is_none());
    }

    #[test]
    fn test_backend_failure_falls_back_to_heuristics() {
        let engine = AnalysisEngine::with_backend(Box::new(FailingBackend));
        let text = "Invoice total $99.00 due 2024-02-01";

        let result = engine.analyze(text);
        assert_eq!(result, HeuristicAnalyzer.analyze_text(text));
        assert_eq!(result.document_type, "invoice");
    }

    #[test]
    fn test_backend_success_is_returned_unchanged() {
        let engine = AnalysisEngine::with_backend(Box::new(CannedBackend));
        let result = engine.analyze("whatever");

        assert_eq!(result.document_type, "contract");
        assert!(result.key_entities.names.contains("Acme Corp"));
    }

    #[test]
    fn test_key_entities_serialize_all_categories() {
        let json = serde_json::to_value(KeyEntities::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["names", "dates", "amounts", "other"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
    }
}
