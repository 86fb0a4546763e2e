use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            worker_count: default_worker_count(),
            max_file_size: default_max_file_size(),
            log_level: default_log_level(),
            ocr: OcrConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Tesseract page segmentation mode; 6 assumes a single uniform block of text.
    #[serde(default = "default_page_segmentation_mode")]
    pub page_segmentation_mode: u8,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_true() -> bool {
    true
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

fn default_page_segmentation_mode() -> u8 {
    6
}

fn default_dpi() -> u32 {
    300
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: default_languages(),
            page_segmentation_mode: default_page_segmentation_mode(),
            dpi: default_dpi(),
        }
    }
}

/// Remote analysis backend configuration.
///
/// The backend is only used when `enabled` is true *and* a credential
/// resolves; otherwise the rule-based analyzer runs without any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Inline API key. Prefer `api_key_file` or `api_key_env_var` outside local testing.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of leading characters of the document sent to the backend.
    #[serde(default = "default_prompt_char_limit")]
    pub prompt_char_limit: usize,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_key_env_var() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_prompt_char_limit() -> usize {
    4000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            prompt_char_limit: default_prompt_char_limit(),
        }
    }
}

impl AnalysisConfig {
    /// A config that never reaches the network, regardless of environment.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            api_key_env_var: None,
            ..Self::default()
        }
    }
}
