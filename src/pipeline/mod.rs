//! Pipeline stages for directory-to-composite stitching.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different extraction backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ extract ──▶ bounds ──▶ crop ──▶ compose ──▶ encode
//! (dir)    (pdfium/     (Sobel)   (tile)   (stack)     (png/svg/ai/pdf)
//!           fallback)
//! ```
//!
//! 1. [`scan`]    — enumerate the directory's PDFs, sorted and deduplicated
//! 2. [`extract`] — one raster per document via [`extract::RasterSource`],
//!    with the deterministic fallback circle when a page has no usable image
//! 3. [`bounds`]  — find the artwork's rectangle by edge analysis
//! 4. [`crop`]    — letterbox the artwork into a fixed-size tile
//! 5. [`compose`] — stack tiles vertically into one canvas
//! 6. [`encode`]  — serialise the canvas in the configured format

pub mod bounds;
pub mod compose;
pub mod crop;
pub mod encode;
pub mod extract;
pub mod scan;
