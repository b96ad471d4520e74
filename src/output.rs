//! Result types returned by a batch stitch run.
//!
//! [`StitchOutput`] is the full run report: where the composite landed, one
//! [`DocumentRecord`] per scanned document (in input-sorted order, including
//! the failed ones), and aggregate [`StitchStats`]. Everything is
//! serde-serialisable so the CLI's `--json` mode can dump it verbatim.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The result of a batch stitch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchOutput {
    /// Path the composite was written to (after directory/timestamp
    /// resolution — not necessarily the configured `output_path` verbatim).
    pub output_path: PathBuf,

    /// One record per scanned document, in input-sorted order.
    pub documents: Vec<DocumentRecord>,

    /// Aggregate statistics.
    pub stats: StitchStats,
}

/// Outcome for a single scanned document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// 0-based position in the sorted input list. Failed documents keep
    /// their position here even though they occupy no tile slot.
    pub index: usize,

    /// The source PDF.
    pub path: PathBuf,

    /// `Some` if the document was skipped; `None` if it contributed a tile.
    pub error: Option<DocumentError>,
}

impl DocumentRecord {
    /// Did this document contribute a tile to the composite?
    pub fn stitched(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for a batch stitch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StitchStats {
    /// Documents found by the directory scan.
    pub total_documents: usize,
    /// Documents that contributed a tile.
    pub stitched_documents: usize,
    /// Documents skipped after a per-document failure.
    pub failed_documents: usize,
    /// Composite width in pixels (equals the configured box size).
    pub canvas_width: u32,
    /// Composite height in pixels: `n·(box_size + spacing) − spacing`.
    pub canvas_height: u32,
    /// Wall-clock time spent extracting, analysing, and cropping.
    pub process_duration_ms: u64,
    /// Wall-clock time spent compositing and encoding the output file.
    pub encode_duration_ms: u64,
    /// Total wall-clock time for the run.
    pub total_duration_ms: u64,
}
