//! Raster extraction: one embedded image per document, with a deterministic
//! fallback.
//!
//! ## Why a trait?
//!
//! The real extraction step needs a pdfium shared library at runtime. Putting
//! it behind [`RasterSource`] keeps the rest of the pipeline a pure image
//! computation: tests (and environments without pdfium) inject
//! [`PlaceholderSource`] and exercise everything downstream against the
//! [`fallback_raster`] fixture instead.
//!
//! ## Why first page, first object?
//!
//! The input corpus is single-illustration documents (logo sheets, artwork
//! exports) where the first page's first decodable image object *is* the
//! artwork. This is not a general PDF renderer: pages whose artwork is drawn
//! with vector operators rather than an embedded raster get the fallback.

use crate::error::DocumentError;
use image::{DynamicImage, Rgba, RgbaImage};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Page consulted for every document (0-based). Only the first page is ever
/// considered.
const FIRST_PAGE: u16 = 0;

/// Fallback canvas dimensions and circle geometry.
const FALLBACK_WIDTH: u32 = 800;
const FALLBACK_HEIGHT: u32 = 600;
const FALLBACK_CENTER: (i64, i64) = (400, 300);
const FALLBACK_RADIUS_SQ: i64 = 10_000; // radius 100

/// Capability interface: extract the embedded raster objects of one page.
///
/// An opaque, fallible operation returning zero or more decoded images.
/// Implementations must be `Send + Sync`; the pipeline may call them from
/// worker threads.
pub trait RasterSource: Send + Sync {
    /// Decode every embedded raster object of `page_index` (0-based) in the
    /// document at `path`.
    ///
    /// Returning `Ok(vec![])` is not an error — it means "this page carries
    /// no usable raster" and triggers the fallback generator. `Err` means the
    /// document itself could not be processed and is skipped by the batch.
    fn extract_rasters(
        &self,
        path: &Path,
        page_index: u16,
    ) -> Result<Vec<DynamicImage>, DocumentError>;
}

/// The default source: reads embedded image objects via pdfium.
///
/// Binds to the pdfium library on every call; the binding is cheap compared
/// to document parsing and keeps the type free of non-`Send` state.
pub struct PdfiumSource;

impl RasterSource for PdfiumSource {
    fn extract_rasters(
        &self,
        path: &Path,
        page_index: u16,
    ) -> Result<Vec<DynamicImage>, DocumentError> {
        let pdfium = Pdfium::default();

        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            DocumentError::ExtractionFailed {
                path: path.to_path_buf(),
                detail: format!("{:?}", e),
            }
        })?;

        let pages = document.pages();
        let page = pages.get(page_index).map_err(|e| {
            DocumentError::ExtractionFailed {
                path: path.to_path_buf(),
                detail: format!("page {}: {:?}", page_index + 1, e),
            }
        })?;

        let mut images = Vec::new();
        for object in page.objects().iter() {
            if let Some(image_object) = object.as_image_object() {
                // Objects that fail to decode are skipped, not fatal: the
                // next object (or the fallback) covers for them.
                match image_object.get_raw_image() {
                    Ok(img) => images.push(img),
                    Err(e) => {
                        warn!("{}: undecodable image object: {:?}", path.display(), e)
                    }
                }
            }
        }

        debug!(
            "{}: {} raster object(s) on page {}",
            path.display(),
            images.len(),
            page_index + 1
        );
        Ok(images)
    }
}

/// A source that never yields an image, forcing the fallback raster.
///
/// Used by tests as a deterministic stand-in, and usable wherever a pdfium
/// library is unavailable.
pub struct PlaceholderSource;

impl RasterSource for PlaceholderSource {
    fn extract_rasters(
        &self,
        _path: &Path,
        _page_index: u16,
    ) -> Result<Vec<DynamicImage>, DocumentError> {
        Ok(Vec::new())
    }
}

/// Obtain one raster for `path`: the first usable extracted object, or the
/// fallback raster when the page yields none.
///
/// "Usable" means non-zero in both dimensions; zero-area objects are
/// discarded the same way undecodable ones are.
pub fn extract_raster(
    source: &dyn RasterSource,
    path: &Path,
) -> Result<RgbaImage, DocumentError> {
    let rasters = source.extract_rasters(path, FIRST_PAGE)?;

    let usable = rasters
        .into_iter()
        .find(|img| img.width() > 0 && img.height() > 0);

    match usable {
        Some(img) => Ok(img.to_rgba8()),
        None => {
            debug!("{}: no usable raster, using fallback", path.display());
            Ok(fallback_raster())
        }
    }
}

/// Deterministic placeholder: an 800×600 white canvas with a filled black
/// circle of radius 100 centered at (400, 300).
///
/// Parameterless and bit-reproducible — tests rely on it as a known-shape
/// fixture, and the batch relies on it so one unreadable document can never
/// abort a whole run.
pub fn fallback_raster() -> RgbaImage {
    let white = Rgba([255u8, 255, 255, 255]);
    let black = Rgba([0u8, 0, 0, 255]);
    let mut img = RgbaImage::from_pixel(FALLBACK_WIDTH, FALLBACK_HEIGHT, white);

    let (cx, cy) = FALLBACK_CENTER;
    for y in 200..400i64 {
        for x in 200..600i64 {
            if (x - cx) * (x - cx) + (y - cy) * (y - cy) < FALLBACK_RADIUS_SQ {
                img.put_pixel(x as u32, y as u32, black);
            }
        }
    }

    img
}
