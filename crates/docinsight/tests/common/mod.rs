//! Shared test utilities for docinsight integration tests.
//!
//! - `TestHarness` for isolated runs inside a temp directory
//! - scripted OCR and chat doubles so no test needs Tesseract or a network

pub mod doubles;
pub mod harness;

pub use doubles::*;
pub use harness::TestHarness;
