//! Test harness for isolated pipeline runs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use docinsight::analysis::{AnalysisEngine, AnalysisSettings, ChatBackend, RemoteAnalyzer};
use docinsight::config::AnalysisConfig;
use docinsight::pipeline::{NoopProgress, Pipeline};
use docinsight::processor::{ContentCategory, OcrEngine, TextExtractor};
use docinsight::ProcessingRecord;

pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");
        Self {
            temp_dir,
            input_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(filename);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn write_text_input(&self, filename: &str, content: &str) -> PathBuf {
        self.write_input(filename, content.as_bytes())
    }

    /// Writes an all-white PNG.
    pub fn write_blank_png(&self, filename: &str) -> PathBuf {
        let path = self.input_dir.join(filename);
        image::RgbImage::from_pixel(32, 32, image::Rgb([255, 255, 255]))
            .save(&path)
            .expect("Failed to write PNG");
        path
    }

    /// Pipeline with no OCR engine and the rule-based analyzer.
    pub fn fallback_pipeline() -> Pipeline {
        Pipeline::new(TextExtractor::new(None), AnalysisEngine::default())
    }

    pub fn ocr_pipeline(engine: impl OcrEngine + 'static) -> Pipeline {
        let engine: Arc<dyn OcrEngine> = Arc::new(engine);
        Pipeline::new(TextExtractor::new(Some(engine)), AnalysisEngine::default())
    }

    /// Text-only pipeline whose analysis goes through `chat`.
    pub fn remote_pipeline(chat: impl ChatBackend + 'static) -> Pipeline {
        let settings = AnalysisSettings::with_credential(&AnalysisConfig::default(), None);
        let remote = RemoteAnalyzer::new(Box::new(chat), &settings);
        Pipeline::new(
            TextExtractor::new(None),
            AnalysisEngine::with_backend(Box::new(remote)),
        )
    }

    pub fn run(pipeline: &Pipeline, path: &Path, category: ContentCategory) -> ProcessingRecord {
        pipeline.run(path, category, &NoopProgress)
    }
}
