//! Configuration types for a batch stitch run.
//!
//! All pipeline behaviour is controlled through [`StitchConfig`], built via
//! its [`StitchConfigBuilder`]. Keeping every knob in one immutable struct
//! makes it trivial to share a run's configuration across threads, serialise
//! it for logging, and diff two runs to understand why their outputs differ.
//! Nothing in the pipeline mutates the config after `build()`.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::cancel::CancelFlag;
use crate::error::StitchError;
use crate::pipeline::extract::RasterSource;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one batch stitch run.
///
/// Built via [`StitchConfig::builder()`].
///
/// # Example
/// ```rust
/// use pdfstitch::{OutputFormat, StitchConfig};
///
/// let config = StitchConfig::builder()
///     .input_dir("covers/")
///     .output_path("out/")
///     .box_size(300)
///     .spacing(4)
///     .format(OutputFormat::Svg)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct StitchConfig {
    /// Directory scanned (non-recursively) for `.pdf` / `.PDF` files.
    pub input_dir: PathBuf,

    /// Where the composite is written.
    ///
    /// A file path is used as-is (the format extension is appended when
    /// missing). A directory gets a synthesised
    /// `stitched_<YYYYMMDD_HHMMSS>.<ext>` filename inside it.
    pub output_path: PathBuf,

    /// Tile edge length in pixels. Default: 200.
    ///
    /// Every document contributes exactly one `box_size`×`box_size` tile,
    /// regardless of its artwork's aspect ratio — content is letterboxed onto
    /// a white square, never stretched. The composite's width equals this
    /// value exactly.
    pub box_size: u32,

    /// Vertical gap between tiles in pixels. Default: 10.
    ///
    /// The composite's height is `n·(box_size + spacing) − spacing`: white
    /// fill between tiles, none above the first or below the last.
    pub spacing: u32,

    /// Output encoding. Default: [`OutputFormat::Png`].
    pub format: OutputFormat,

    /// Pixel-emission style for SVG output. Default: [`SvgStyle::Rects`].
    ///
    /// Ignored for other formats.
    pub svg_style: SvgStyle,

    /// Number of documents processed at once. Default: 1.
    ///
    /// Extraction, bounds detection, and cropping are independent per
    /// document, so they can fan out; tile order in the composite is always
    /// the input-sorted file order regardless of completion order. The
    /// default of 1 reproduces a strictly sequential batch.
    pub concurrency: usize,

    /// Raster source used for extraction. If None, pdfium is used.
    ///
    /// Inject [`crate::pipeline::extract::PlaceholderSource`] in tests or in
    /// environments without a pdfium library.
    pub source: Option<Arc<dyn RasterSource>>,

    /// Progress callback fired per document. If None, no events are emitted.
    pub progress_callback: Option<ProgressCallback>,

    /// Cooperative cancellation flag, checked between documents.
    pub cancel: Option<CancelFlag>,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_path: PathBuf::new(),
            box_size: 200,
            spacing: 10,
            format: OutputFormat::Png,
            svg_style: SvgStyle::Rects,
            concurrency: 1,
            source: None,
            progress_callback: None,
            cancel: None,
        }
    }
}

impl fmt::Debug for StitchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StitchConfig")
            .field("input_dir", &self.input_dir)
            .field("output_path", &self.output_path)
            .field("box_size", &self.box_size)
            .field("spacing", &self.spacing)
            .field("format", &self.format)
            .field("svg_style", &self.svg_style)
            .field("concurrency", &self.concurrency)
            .field("source", &self.source.as_ref().map(|_| "<dyn RasterSource>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl StitchConfig {
    /// Create a new builder for `StitchConfig`.
    pub fn builder() -> StitchConfigBuilder {
        StitchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`StitchConfig`].
#[derive(Debug)]
pub struct StitchConfigBuilder {
    config: StitchConfig,
}

impl StitchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn box_size(mut self, px: u32) -> Self {
        self.config.box_size = px;
        self
    }

    pub fn spacing(mut self, px: u32) -> Self {
        self.config.spacing = px;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn svg_style(mut self, style: SvgStyle) -> Self {
        self.config.svg_style = style;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn source(mut self, source: Arc<dyn RasterSource>) -> Self {
        self.config.source = Some(source);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn cancel(mut self, flag: CancelFlag) -> Self {
        self.config.cancel = Some(flag);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<StitchConfig, StitchError> {
        let c = &self.config;
        if c.box_size == 0 {
            return Err(StitchError::InvalidConfig("box_size must be > 0".into()));
        }
        if c.input_dir.as_os_str().is_empty() {
            return Err(StitchError::InvalidConfig("input_dir is required".into()));
        }
        if c.output_path.as_os_str().is_empty() {
            return Err(StitchError::InvalidConfig("output_path is required".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output encoding for the composite canvas.
///
/// PNG is the only lossless-raster reference format; the other three are
/// simplified, viewer-compatible approximations (the SVG and AI outputs are
/// pixel rasters dressed in vector syntax, not traced curves).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless raster. (default)
    #[default]
    Png,
    /// Pixel-mode SVG; see [`SvgStyle`].
    Svg,
    /// Simplified Adobe Illustrator file (EPS with an inline hex raster).
    Ai,
    /// Minimal single-page PDF wrapping the canvas as an image XObject.
    Pdf,
}

impl OutputFormat {
    /// Parse a textual format key. Unrecognised keys fall back to PNG.
    ///
    /// The fallback is deliberate: a batch run with a mistyped format should
    /// still persist its composite rather than abort after minutes of work.
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "svg" => OutputFormat::Svg,
            "ai" => OutputFormat::Ai,
            "pdf" => OutputFormat::Pdf,
            _ => OutputFormat::Png,
        }
    }

    /// The filename extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Ai => "ai",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How non-white pixels are emitted in SVG output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgStyle {
    /// One 2×2 `<rect>` per sampled pixel, sampling every other pixel.
    /// Quarter the element count, half the resolution. (default)
    #[default]
    Rects,
    /// One 1×1 path command per pixel at full resolution, grouped into a
    /// single `<path>` element per distinct RGB colour.
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = StitchConfig::builder()
            .input_dir("in")
            .output_path("out")
            .build()
            .unwrap();
        assert_eq!(config.box_size, 200);
        assert_eq!(config.spacing, 10);
        assert_eq!(config.format, OutputFormat::Png);
        assert_eq!(config.svg_style, SvgStyle::Rects);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn builder_rejects_zero_box_size() {
        let result = StitchConfig::builder()
            .input_dir("in")
            .output_path("out")
            .box_size(0)
            .build();
        assert!(matches!(result, Err(StitchError::InvalidConfig(_))));
    }

    #[test]
    fn builder_requires_paths() {
        assert!(StitchConfig::builder().output_path("out").build().is_err());
        assert!(StitchConfig::builder().input_dir("in").build().is_err());
    }

    #[test]
    fn concurrency_clamps_to_one() {
        let config = StitchConfig::builder()
            .input_dir("in")
            .output_path("out")
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn format_key_fallback_is_png() {
        assert_eq!(OutputFormat::from_key("svg"), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_key("AI"), OutputFormat::Ai);
        assert_eq!(OutputFormat::from_key("Pdf"), OutputFormat::Pdf);
        assert_eq!(OutputFormat::from_key("png"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_key("jpeg"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_key(""), OutputFormat::Png);
    }

    #[test]
    fn format_extension_round_trip() {
        for f in [
            OutputFormat::Png,
            OutputFormat::Svg,
            OutputFormat::Ai,
            OutputFormat::Pdf,
        ] {
            assert_eq!(OutputFormat::from_key(f.extension()), f);
        }
    }
}
