//! Worker pool and document store working together.

mod common;

use std::sync::Arc;

use common::TestHarness;
use docinsight::analysis::AnalysisSettings;
use docinsight::config::OcrConfig;
use docinsight::store::{DocumentFilter, DocumentMeta, DocumentResults, DocumentStore};
use docinsight::{Job, MemoryDocumentStore, PipelineConfig, ProcessingStatus, WorkerPool};

fn fallback_config() -> Arc<PipelineConfig> {
    let ocr = OcrConfig {
        enabled: false,
        ..OcrConfig::default()
    };
    Arc::new(PipelineConfig::new(ocr, AnalysisSettings::fallback_only()))
}

#[test]
fn test_batch_through_pool_and_store() {
    let harness = TestHarness::new();
    let files = [
        harness.write_text_input("invoice.txt", "Invoice: amount due $310.50"),
        harness.write_text_input("cv.txt", "Resume of J. Doe, ten years experience"),
        harness.write_text_input("empty.txt", ""),
        harness.write_blank_png("scan.png"),
    ];

    let store = MemoryDocumentStore::new(1024 * 1024);
    let pool = WorkerPool::new(fallback_config(), 3).unwrap();

    for path in &files {
        let meta = DocumentMeta::from_path(path.clone(), None).unwrap();
        let doc = store.register(meta).unwrap();
        store.mark_processing(&doc.id).unwrap();
        pool.submit(Job::for_document(&doc.id, path.clone(), Some(doc.mime_type)))
            .unwrap();
    }

    for _ in 0..files.len() {
        let result = pool.recv_result().unwrap();
        store.apply_record(&result.document_id, &result.record).unwrap();
    }
    pool.shutdown();
    pool.wait();

    let completed = store.list(&DocumentFilter::with_status(ProcessingStatus::Completed));
    let failed = store.list(&DocumentFilter::with_status(ProcessingStatus::Failed));
    assert_eq!(completed.len(), 2);
    assert_eq!(failed.len(), 2);
    assert!(store
        .list(&DocumentFilter::with_status(ProcessingStatus::Processing))
        .is_empty());

    let types: Vec<&str> = completed
        .iter()
        .map(|d| d.analysis.as_ref().unwrap().document_type.as_str())
        .collect();
    assert_eq!(types, ["invoice", "resume"]);

    // Without an OCR engine the image cannot be read.
    let scan = failed.iter().find(|d| d.filename == "scan.png").unwrap();
    assert_eq!(scan.mime_type, "image/png");
    assert!(scan.errors[0].starts_with("OCR failed: "));

    match store.results(&completed[0].id).unwrap() {
        DocumentResults::Completed(results) => {
            assert!(results.key_entities.amounts.contains("$310.50"));
            assert!(results.processing_time_secs.is_some());
        }
        other => panic!("expected completed results, got {:?}", other),
    }
}

#[test]
fn test_oversized_file_is_rejected_before_processing() {
    let harness = TestHarness::new();
    let path = harness.write_text_input("big.txt", &"x".repeat(2048));

    let store = MemoryDocumentStore::new(1024);
    let meta = DocumentMeta::from_path(path, None).unwrap();

    assert!(store.register(meta).is_err());
    assert!(store.list(&DocumentFilter::default()).is_empty());
}
