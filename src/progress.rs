//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::StitchConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through the batch.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a GUI status label, or a terminal progress
//! bar — without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it works correctly when
//! documents are processed concurrently.

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it works through a batch.
///
/// Implementations must be `Send + Sync` (documents may be processed
/// concurrently when `concurrency > 1`). All methods have default no-op
/// implementations so callers only override what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the directory scan, before any document is processed.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document's extraction begins.
    ///
    /// `index` is the document's 0-based position in the sorted input list.
    fn on_document_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a document's tile has been produced.
    fn on_document_complete(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a document fails and is dropped from the batch.
    fn on_document_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        let _ = (index, total, path, error);
    }

    /// Called once after the composite has been written (not on fatal errors).
    fn on_batch_complete(&self, total_documents: usize, stitched: usize) {
        let _ = (total_documents, stitched);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::StitchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
