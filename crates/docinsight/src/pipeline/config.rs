use crate::analysis::AnalysisSettings;
use crate::config::{Config, OcrConfig};
use crate::error::ConfigError;

/// Settings shared by every pipeline instance, resolved once at startup.
#[derive(Debug)]
pub struct PipelineConfig {
    pub ocr: OcrConfig,
    pub analysis: AnalysisSettings,
}

impl PipelineConfig {
    /// Resolves the analysis credential; fails only if a configured key file cannot be read.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            ocr: config.ocr.clone(),
            analysis: AnalysisSettings::from_config(&config.analysis)?,
        })
    }

    pub fn new(ocr: OcrConfig, analysis: AnalysisSettings) -> Self {
        Self { ocr, analysis }
    }
}
