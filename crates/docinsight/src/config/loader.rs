use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SUPPORTED_VERSION: &str = "1.0";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be at least 1".to_string(),
        });
    }

    if config.max_file_size == 0 {
        return Err(ConfigError::Validation {
            message: "max_file_size must be greater than 0".to_string(),
        });
    }

    if config.ocr.page_segmentation_mode > 13 {
        return Err(ConfigError::Validation {
            message: format!(
                "ocr.page_segmentation_mode must be between 0 and 13, got {}",
                config.ocr.page_segmentation_mode
            ),
        });
    }

    let analysis = &config.analysis;
    if !(0.0..=2.0).contains(&analysis.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "analysis.temperature must be between 0.0 and 2.0, got {}",
                analysis.temperature
            ),
        });
    }
    if analysis.max_tokens == 0 || analysis.timeout_secs == 0 || analysis.prompt_char_limit == 0 {
        return Err(ConfigError::Validation {
            message: "analysis.max_tokens, timeout_secs and prompt_char_limit must be non-zero"
                .to_string(),
        });
    }
    if analysis.enabled && analysis.endpoint.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "analysis.endpoint must be set when analysis is enabled".to_string(),
        });
    }

    Ok(())
}
