//! Error types for the pdfstitch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`StitchError`] — **Fatal**: the batch cannot proceed at all (missing
//!   input directory, no PDFs to process, every document failed, the composite
//!   could not be written). Returned as `Err(StitchError)` from the top-level
//!   `stitch*` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (unreadable
//!   PDF, bounds detection glitch) but the rest of the batch is fine. Stored
//!   inside [`crate::output::DocumentRecord`] so callers can inspect partial
//!   success rather than losing the whole run to one bad file.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! document failure, log and continue, or collect all errors for a post-run
//! report. The pipeline itself always continues — a failed document is simply
//! dropped from the composite, never reattempted.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfstitch library.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentRecord`] rather than propagated here.
#[derive(Debug, Error)]
pub enum StitchError {
    // ── Scan errors ───────────────────────────────────────────────────────
    /// Input directory was not found or is not a directory.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is a directory.")]
    DirectoryNotFound { path: PathBuf },

    /// The directory exists but contains no PDF files.
    #[error(
        "No PDF files found in '{path}'\nCheck that:\n  \
         1. The directory contains PDF files.\n  \
         2. Their extension is .pdf or .PDF (subdirectories are not scanned)."
    )]
    NoMatchingFiles { path: PathBuf },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// Every document in the batch failed; there is nothing to composite.
    #[error("All {total} documents failed; nothing to stitch.\nFirst error: {first_error}")]
    EmptyTileSet { total: usize, first_error: String },

    /// The batch was cancelled between documents.
    #[error("Cancelled after {processed}/{total} documents")]
    Cancelled { processed: usize, total: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Serialising the composite into the selected format failed.
    #[error("Failed to encode composite as {format}: {detail}")]
    EncodingFailed { format: String, detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// Stored in [`crate::output::DocumentRecord`] when a document fails.
/// The overall batch continues unless ALL documents fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// No raster could be obtained from the document.
    #[error("'{path}': extraction failed: {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// Content-bounds analysis failed.
    #[error("'{path}': bounds detection failed: {detail}")]
    BoundsDetectionFailed { path: PathBuf, detail: String },
}

impl DocumentError {
    /// The document the error belongs to.
    pub fn path(&self) -> &PathBuf {
        match self {
            DocumentError::ExtractionFailed { path, .. } => path,
            DocumentError::BoundsDetectionFailed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tile_set_display() {
        let e = StitchError::EmptyTileSet {
            total: 4,
            first_error: "broken.pdf: not a PDF".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 4 documents failed"), "got: {msg}");
        assert!(msg.contains("broken.pdf"));
    }

    #[test]
    fn cancelled_display() {
        let e = StitchError::Cancelled {
            processed: 2,
            total: 7,
        };
        assert!(e.to_string().contains("2/7"));
    }

    #[test]
    fn no_matching_files_display_mentions_extensions() {
        let e = StitchError::NoMatchingFiles {
            path: PathBuf::from("/tmp/empty"),
        };
        let msg = e.to_string();
        assert!(msg.contains(".pdf"));
        assert!(msg.contains("/tmp/empty"));
    }

    #[test]
    fn document_error_path_accessor() {
        let e = DocumentError::ExtractionFailed {
            path: PathBuf::from("a.pdf"),
            detail: "no image objects".into(),
        };
        assert_eq!(e.path(), &PathBuf::from("a.pdf"));

        let e = DocumentError::BoundsDetectionFailed {
            path: PathBuf::from("b.pdf"),
            detail: "zero-area image".into(),
        };
        assert_eq!(e.path(), &PathBuf::from("b.pdf"));
    }
}
