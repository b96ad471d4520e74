//! # pdfstitch
//!
//! Stitch the embedded artwork of a folder of PDFs into one composite image.
//!
//! ## Why this crate?
//!
//! Designers end up with folders of single-illustration PDFs — logo sheets,
//! artwork exports, proofs — and want one contact-sheet image of all of
//! them. Rendering whole pages wastes the frame on margins; this crate
//! instead pulls each document's embedded raster, finds the artwork inside
//! it by edge analysis, and crops *that* into a uniform tile, so the
//! composite shows artwork, not whitespace.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory of PDFs
//!  │
//!  ├─ 1. Scan     list *.pdf / *.PDF, sorted (tile order is fixed here)
//!  ├─ 2. Extract  first page's embedded raster via pdfium, or a
//!  │              deterministic fallback circle when none decodes
//!  ├─ 3. Bounds   Sobel edge analysis → content rectangle + margin
//!  ├─ 4. Crop     aspect-preserving window, letterboxed onto a white tile
//!  ├─ 5. Compose  stack tiles vertically with white spacing
//!  └─ 6. Encode   PNG, pixel-SVG, AI (EPS), or minimal PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfstitch::{stitch, StitchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StitchConfig::builder()
//!         .input_dir("covers/")
//!         .output_path("out/")
//!         .build()?;
//!     let output = stitch(&config).await?;
//!     println!("{}", output.output_path.display());
//!     eprintln!(
//!         "stitched {}/{} documents",
//!         output.stats.stitched_documents,
//!         output.stats.total_documents
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfstitch` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfstitch = { version = "0.1", default-features = false }
//! ```
//!
//! ## Scope
//!
//! Not a PDF renderer (one embedded raster per document, first page only),
//! not a vectoriser (the SVG and AI outputs are pixel rasters in vector
//! clothing), and not a spec-complete PDF/PostScript writer (the outputs are
//! minimal, viewer-compatible approximations).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cancel;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stitch;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cancel::CancelFlag;
pub use config::{OutputFormat, StitchConfig, StitchConfigBuilder, SvgStyle};
pub use error::{DocumentError, StitchError};
pub use output::{DocumentRecord, StitchOutput, StitchStats};
pub use pipeline::extract::{fallback_raster, PdfiumSource, PlaceholderSource, RasterSource};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stitch::{list_documents, stitch, stitch_sync};
