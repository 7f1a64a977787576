//! Test utilities for Quill tests
//!
//! Fixture loading helpers plus mock collaborators that count and record what
//! the pipeline asks of them.

mod mocks;

pub use mocks::{CountingCompiler, RecordingClipboard};

/// Loads a fixture file from the calling crate's directory
///
/// # Arguments
/// * `path` - Path relative to the crate's manifest directory
///
/// # Example
/// ```ignore
/// let content = fixture("tests/fixtures/stream.jsonl").await;
/// ```
pub async fn fixture(path: &str) -> String {
    tokio::fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("Failed to load fixture at {path}: {e}"))
}

/// Macro to load a fixture file relative to the calling crate's manifest
/// directory
///
/// # Example
/// ```ignore
/// let content = fixture!("tests/fixtures/stream.jsonl").await;
/// ```
#[macro_export]
macro_rules! fixture {
    ($path:expr) => {
        $crate::fixture(&format!("{}/{}", env!("CARGO_MANIFEST_DIR"), $path))
    };
}
