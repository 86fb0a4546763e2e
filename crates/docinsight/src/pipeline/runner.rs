use std::path::Path;

use tracing::{debug, info, info_span};

use crate::analysis::AnalysisEngine;
use crate::processor::{ContentCategory, TextExtractor};
use crate::sanitize;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::progress::{ProcessingPhase, ProgressEvent, ProgressReporter};
use super::record::{ProcessingRecord, ProcessingStatus, STEP_NLP_ANALYSIS};

/// Runs extraction followed by analysis for one document at a time.
pub struct Pipeline {
    extractor: TextExtractor,
    analysis: AnalysisEngine,
}

impl Pipeline {
    /// Production constructor; builds the OCR engine and analysis backend from config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            extractor: TextExtractor::from_config(&config.ocr),
            analysis: AnalysisEngine::from_settings(&config.analysis),
        }
    }

    /// Assembles a pipeline from already-built stages.
    pub fn new(extractor: TextExtractor, analysis: AnalysisEngine) -> Self {
        Self {
            extractor,
            analysis,
        }
    }

    pub fn analysis_mode(&self) -> &'static str {
        self.analysis.mode()
    }

    pub fn ocr_available(&self) -> bool {
        self.extractor.supports(ContentCategory::Image)
    }

    /// Processes one document. Never fails: every error ends up in the returned record.
    pub fn run(
        &self,
        path: &Path,
        category: ContentCategory,
        progress: &dyn ProgressReporter,
    ) -> ProcessingRecord {
        let filename = sanitize::redact_path(path);
        let _pipeline_span =
            info_span!("pipeline", filename = %filename, category = %category).entered();

        let mut record = ProcessingRecord::begin(path, category);

        match self.run_stages(&mut record, path, category, progress) {
            Ok(()) => {
                let document_type = record
                    .analysis()
                    .map(|a| a.document_type.clone())
                    .unwrap_or_default();
                info!(document_type = %document_type, "Document processed");
                progress.report(ProgressEvent::Completed { document_type });
                record.finish(ProcessingStatus::Completed)
            }
            Err(e) => {
                let error = e.to_string();
                info!("Document processing failed: {}", error);
                progress.report(ProgressEvent::Failed {
                    error: error.clone(),
                });
                record.push_error(error);
                record.finish(ProcessingStatus::Failed)
            }
        }
    }

    fn run_stages(
        &self,
        record: &mut ProcessingRecord,
        path: &Path,
        category: ContentCategory,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        // Step 1: Extract text
        let text = {
            let _step = info_span!("extract", step = category.step_name()).entered();
            progress.report(ProgressEvent::Phase {
                phase: ProcessingPhase::Extracting,
                message: match category {
                    ContentCategory::Image => "Running OCR...".to_string(),
                    ContentCategory::Text => "Reading text...".to_string(),
                },
            });
            self.step_extract(record, path, category)?
        };

        // Step 2: Analyze
        {
            let _step = info_span!("analyze", backend = self.analysis.mode()).entered();
            progress.report(ProgressEvent::Phase {
                phase: ProcessingPhase::Analyzing,
                message: "Analyzing document...".to_string(),
            });
            let analysis = self.analysis.analyze(&text);
            debug!(
                document_type = %analysis.document_type,
                sentiment = analysis.sentiment_score,
                "Analysis finished"
            );
            record.set_analysis(analysis);
            record.complete_step(STEP_NLP_ANALYSIS);
        }

        Ok(())
    }

    /// Runs the extractor and applies the step-log rules. Returns the text to analyze.
    fn step_extract(
        &self,
        record: &mut ProcessingRecord,
        path: &Path,
        category: ContentCategory,
    ) -> Result<String, PipelineError> {
        let extraction = self.extractor.extract(path, category);
        let failure = extraction.error.clone();
        let has_text = extraction.has_text();
        let text = extraction.text.clone();

        debug!(
            confidence = extraction.confidence,
            words = extraction.word_count,
            "Extraction finished"
        );
        record.set_extraction(extraction);

        match (category, failure) {
            (ContentCategory::Image, Some(error)) => {
                record.complete_step(category.step_name());
                return Err(PipelineError::Ocr(error));
            }
            // A text read that fails never counts as a completed step.
            (ContentCategory::Text, Some(error)) => {
                return Err(PipelineError::TextExtraction(error));
            }
            (_, None) => record.complete_step(category.step_name()),
        }

        if !has_text {
            return Err(PipelineError::NoText);
        }

        Ok(text)
    }
}
