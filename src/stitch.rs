//! Batch entry points: scan a directory, stitch its PDFs, persist the result.
//!
//! ## Failure policy
//!
//! Scan-level errors and the final save are fatal; everything per-document
//! is not. A document that cannot be extracted or analysed is logged,
//! recorded, and dropped from the composite — the batch only fails outright
//! when *every* document failed ([`StitchError::EmptyTileSet`]) so one bad
//! file can never sink a folder of good ones. There is no retry logic
//! anywhere: a failed document is dropped, not reattempted.
//!
//! ## Ordering
//!
//! Tile order in the composite is the lexicographic order of the scanned
//! paths, full stop. With `concurrency > 1` documents are processed through
//! an *ordered* buffered stream, so results come back in input order no
//! matter when they finish and the ordering invariant needs no re-sort.

use crate::config::StitchConfig;
use crate::error::{DocumentError, StitchError};
use crate::output::{DocumentRecord, StitchOutput, StitchStats};
use crate::pipeline::{bounds, compose, crop, encode, extract, scan};
use futures::stream::{self, StreamExt};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stitch every PDF in the configured directory into one composite image.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(StitchOutput)` on success, even if some documents failed
/// (check `output.stats.failed_documents`).
///
/// # Errors
/// Returns `Err(StitchError)` only for fatal errors:
/// - Input directory missing, or containing no PDFs
/// - Every document failed (nothing to composite)
/// - The composite could not be encoded or written
/// - The batch was cancelled
pub async fn stitch(config: &StitchConfig) -> Result<StitchOutput, StitchError> {
    let total_start = Instant::now();
    info!("Starting stitch: {}", config.input_dir.display());

    // ── Step 1: Scan input directory ─────────────────────────────────────
    let files = scan::scan_directory(&config.input_dir)?;
    let total = files.len();
    info!("Found {} PDF files", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 2: Resolve the raster source ────────────────────────────────
    let source = resolve_source(config);

    // ── Step 3: Extract → bounds → crop, per document ────────────────────
    let process_start = Instant::now();
    let outcomes = process_documents(config, &source, &files).await;
    let process_duration_ms = process_start.elapsed().as_millis() as u64;

    // ── Step 4: Collect tiles and records in input order ─────────────────
    let mut records = Vec::with_capacity(total);
    let mut tiles = Vec::new();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Some(Ok(tile)) => {
                tiles.push(tile);
                records.push(DocumentRecord {
                    index,
                    path: files[index].clone(),
                    error: None,
                });
            }
            Some(Err(error)) => {
                warn!("Skipping {}: {}", files[index].display(), error);
                records.push(DocumentRecord {
                    index,
                    path: files[index].clone(),
                    error: Some(error),
                });
            }
            // A document that was never dispatched: the batch was cancelled.
            None => {
                return Err(StitchError::Cancelled {
                    processed: records.len(),
                    total,
                });
            }
        }
    }

    let stitched = tiles.len();
    let failed = total - stitched;
    info!(
        "Processed {}/{} documents in {}ms",
        stitched, total, process_duration_ms
    );

    if tiles.is_empty() {
        let first_error = records
            .iter()
            .find_map(|r| r.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(StitchError::EmptyTileSet { total, first_error });
    }

    // ── Step 5: Composite and encode ─────────────────────────────────────
    let encode_start = Instant::now();
    let canvas = compose::compose_tiles(&tiles, config.box_size, config.spacing)?;
    let (canvas_width, canvas_height) = canvas.dimensions();

    let output_path = encode::resolve_output_path(&config.output_path, config.format);
    let (format, svg_style) = (config.format, config.svg_style);
    let encode_path = output_path.clone();
    tokio::task::spawn_blocking(move || {
        encode::encode_canvas(&canvas, &encode_path, format, svg_style)
    })
    .await
    .map_err(|e| StitchError::Internal(format!("Encode task panicked: {}", e)))??;

    let encode_duration_ms = encode_start.elapsed().as_millis() as u64;

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let stats = StitchStats {
        total_documents: total,
        stitched_documents: stitched,
        failed_documents: failed,
        canvas_width,
        canvas_height,
        process_duration_ms,
        encode_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Stitch complete: {}/{} documents → {} ({}ms total)",
        stitched, total, output_path.display(), stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stitched);
    }

    Ok(StitchOutput {
        output_path,
        documents: records,
        stats,
    })
}

/// Synchronous wrapper around [`stitch`].
///
/// Creates a temporary tokio runtime internally.
pub fn stitch_sync(config: &StitchConfig) -> Result<StitchOutput, StitchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| StitchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(stitch(config))
}

/// List the PDF files a stitch run would process, without processing them.
///
/// Same scan contract as the full run: non-recursive, case-insensitive
/// extension match, sorted, deduplicated.
pub async fn list_documents(input_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, StitchError> {
    let dir = input_dir.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || scan::scan_directory(&dir))
        .await
        .map_err(|e| StitchError::Internal(format!("Scan task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The configured raster source, defaulting to pdfium.
fn resolve_source(config: &StitchConfig) -> Arc<dyn extract::RasterSource> {
    match config.source {
        Some(ref source) => Arc::clone(source),
        None => Arc::new(extract::PdfiumSource),
    }
}

/// Run extract → bounds → crop for each file.
///
/// Returns one entry per file, in input order: `Some(result)` for documents
/// that were dispatched, `None` for documents skipped because cancellation
/// was requested first. pdfium and the pixel loops are CPU-bound, so each
/// document runs inside `spawn_blocking`.
async fn process_documents(
    config: &StitchConfig,
    source: &Arc<dyn extract::RasterSource>,
    files: &[PathBuf],
) -> Vec<Option<Result<RgbaImage, DocumentError>>> {
    let total = files.len();
    let box_size = config.box_size;

    stream::iter(files.iter().cloned().enumerate().map(|(index, path)| {
        let source = Arc::clone(source);
        let cb = config.progress_callback.clone();
        let cancel = config.cancel.clone();
        async move {
            if cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                return None;
            }

            if let Some(ref cb) = cb {
                cb.on_document_start(index, total, &path);
            }
            debug!("Processing ({}/{}): {}", index + 1, total, path.display());

            let worker_path = path.clone();
            let result = tokio::task::spawn_blocking(move || {
                process_document(&*source, &worker_path, box_size)
            })
            .await
            .unwrap_or_else(|e| {
                Err(DocumentError::ExtractionFailed {
                    path: path.clone(),
                    detail: format!("worker panicked: {}", e),
                })
            });

            if let Some(ref cb) = cb {
                match &result {
                    Ok(_) => cb.on_document_complete(index, total, &path),
                    Err(e) => cb.on_document_error(index, total, &path, &e.to_string()),
                }
            }

            Some(result)
        }
    }))
    // `buffered` (not `buffer_unordered`): completion order is irrelevant,
    // input order is the contract.
    .buffered(config.concurrency)
    .collect()
    .await
}

/// The per-document pipeline: one raster, one bounds rectangle, one tile.
fn process_document(
    source: &dyn extract::RasterSource,
    path: &Path,
    box_size: u32,
) -> Result<RgbaImage, DocumentError> {
    let raster = extract::extract_raster(source, path)?;

    if raster.width() == 0 || raster.height() == 0 {
        return Err(DocumentError::BoundsDetectionFailed {
            path: path.to_path_buf(),
            detail: "zero-area raster".into(),
        });
    }

    let content = bounds::detect_bounds(&raster);
    debug!(
        "{}: content {}x{} centered at {:?}",
        path.display(),
        content.width(),
        content.height(),
        content.center()
    );

    Ok(crop::smart_crop(&raster, &content, box_size))
}
