//! Output encoding: serialise the composite canvas to disk.
//!
//! Four encodings share one contract: pure serialisation of an RGBA canvas,
//! nothing partial persisted on failure.
//!
//! * **PNG** — lossless raster via the `image` crate; the reference format
//!   (round-trips pixel-identical, used by the correctness tests).
//! * **SVG** — pixel mode, not vectorisation: one mark per non-white pixel,
//!   either 2×2 `<rect>`s at half resolution or colour-grouped 1×1 path
//!   commands at full resolution. See [`crate::config::SvgStyle`].
//! * **AI** — an EPS wrapper around the raw raster: one `colorimage`
//!   operator followed by the pixels as inline hex RGB triples.
//! * **PDF** — a minimal single-page document whose only content is the
//!   canvas as a flate-compressed image XObject.
//!
//! The AI and PDF emitters write the byte-level format by hand. That is
//! deliberate: the outputs are minimal, viewer-compatible approximations,
//! and a full PostScript/PDF library would be a heavyweight dependency for
//! what amounts to a header, a pixel dump, and a trailer.

use crate::config::{OutputFormat, SvgStyle};
use crate::error::StitchError;
use chrono::Local;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Cursor, Write as _};
use std::path::{Path, PathBuf};
use tracing::info;

/// Channel value at or above which a channel counts as "white enough".
/// 253/255 ≈ 0.99 of full scale; anti-aliased near-white halos around
/// letterboxed content are noise, not marks.
const NEAR_WHITE_MIN: u8 = 253;

/// Filename stem used when the output path is a directory.
const OUTPUT_LABEL: &str = "stitched";

/// Resolve the configured output path to a concrete file path.
///
/// A directory gets a synthesised `stitched_<YYYYMMDD_HHMMSS>.<ext>` inside
/// it (each run names itself, so batches never overwrite each other). A file
/// path is used as-is, with the format extension appended when it isn't
/// already there.
pub fn resolve_output_path(output_path: &Path, format: OutputFormat) -> PathBuf {
    let ext = format.extension();

    if output_path.is_dir() {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        return output_path.join(format!("{OUTPUT_LABEL}_{timestamp}.{ext}"));
    }

    let has_ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if has_ext {
        output_path.to_path_buf()
    } else {
        let mut name = output_path.as_os_str().to_os_string();
        name.push(format!(".{ext}"));
        PathBuf::from(name)
    }
}

/// Serialise `canvas` to `path` in the selected format.
pub fn encode_canvas(
    canvas: &RgbaImage,
    path: &Path,
    format: OutputFormat,
    svg_style: SvgStyle,
) -> Result<(), StitchError> {
    let bytes = match format {
        OutputFormat::Png => encode_png(canvas)?,
        OutputFormat::Svg => encode_svg(canvas, svg_style).into_bytes(),
        OutputFormat::Ai => encode_eps(canvas).into_bytes(),
        OutputFormat::Pdf => encode_pdf(canvas)?,
    };

    std::fs::write(path, &bytes).map_err(|source| StitchError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Wrote {} composite ({} bytes) to {}",
        format,
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Is this pixel a mark (vs. background)? Transparent and near-white pixels
/// are background.
fn is_mark(pixel: &Rgba<u8>) -> bool {
    pixel[3] > 0
        && (pixel[0] < NEAR_WHITE_MIN || pixel[1] < NEAR_WHITE_MIN || pixel[2] < NEAR_WHITE_MIN)
}

// ── PNG ──────────────────────────────────────────────────────────────────

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, StitchError> {
    let mut buf = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| StitchError::EncodingFailed {
            format: "png".into(),
            detail: e.to_string(),
        })?;
    Ok(buf)
}

// ── SVG ──────────────────────────────────────────────────────────────────

fn encode_svg(canvas: &RgbaImage, style: SvgStyle) -> String {
    let (width, height) = canvas.dimensions();

    let mut svg = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" \
         xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    match style {
        SvgStyle::Rects => {
            // Half resolution: sample every other pixel, emit it 2×2 so the
            // drawing keeps its size. Quarter the element count.
            for y in (0..height).step_by(2) {
                for x in (0..width).step_by(2) {
                    let p = canvas.get_pixel(x, y);
                    if is_mark(p) {
                        let _ = writeln!(
                            svg,
                            "  <rect x=\"{x}\" y=\"{y}\" width=\"2\" height=\"2\" \
                             fill=\"#{:02x}{:02x}{:02x}\"/>",
                            p[0], p[1], p[2]
                        );
                    }
                }
            }
        }
        SvgStyle::Paths => {
            // Full resolution, one subpath per pixel, one <path> per colour.
            // BTreeMap keys keep the element order deterministic.
            let mut by_color: BTreeMap<(u8, u8, u8), String> = BTreeMap::new();
            for (x, y, p) in canvas.enumerate_pixels() {
                if is_mark(p) {
                    let d = by_color.entry((p[0], p[1], p[2])).or_default();
                    let _ = write!(d, "M{x},{y}h1v1h-1z");
                }
            }
            for ((r, g, b), d) in &by_color {
                let _ = writeln!(
                    svg,
                    "  <path d=\"{d}\" fill=\"#{r:02x}{g:02x}{b:02x}\"/>"
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

// ── AI (EPS) ─────────────────────────────────────────────────────────────

fn encode_eps(canvas: &RgbaImage) -> String {
    let (width, height) = canvas.dimensions();

    let mut eps = format!(
        "%!PS-Adobe-3.0 EPSF-3.0\n\
         %%Creator: pdfstitch\n\
         %%BoundingBox: 0 0 {width} {height}\n\
         %%DocumentData: Clean7Bit\n\
         %%LanguageLevel: 2\n\
         %%Pages: 1\n\
         %%EndComments\n\
         %%BeginProlog\n\
         %%EndProlog\n\
         %%BeginSetup\n\
         %%EndSetup\n\
         %%Page: 1 1\n\
         gsave\n\
         {width} {height} scale\n\
         /DeviceRGB setcolorspace\n"
    );

    // One colorimage operator reading the whole raster from the file, top
    // row first (the [1 0 0 -1 0 h] matrix flips PostScript's y axis).
    let _ = writeln!(
        eps,
        "{width} {height} 8 [1 0 0 -1 0 {height}] \
         {{currentfile 3 {width} mul string readhexstring pop}} false 3 colorimage"
    );

    for y in 0..height {
        for x in 0..width {
            let p = canvas.get_pixel(x, y);
            let _ = write!(eps, "{:02x}{:02x}{:02x}", p[0], p[1], p[2]);
            // Wrap within a row after every 16th pixel; hex readers don't
            // care, humans and line-based tooling do.
            if (x + 1) % 16 == 0 {
                eps.push('\n');
            }
        }
    }

    eps.push_str("\ngrestore\nshowpage\n%%Trailer\n%%EOF\n");
    eps
}

// ── PDF ──────────────────────────────────────────────────────────────────

/// Minimal single-page PDF: Catalog → Pages → Page → image XObject plus a
/// four-line content stream placing it. The image stream is raw 8-bit RGB
/// samples, genuinely flate-compressed to match its `/FlateDecode` filter
/// declaration, and the xref table carries real byte offsets.
fn encode_pdf(canvas: &RgbaImage) -> Result<Vec<u8>, StitchError> {
    let (width, height) = canvas.dimensions();

    // RGB samples, row-major from the top, alpha dropped (tiles are opaque
    // and PDF image XObjects carry no alpha channel).
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for p in canvas.pixels() {
        rgb.extend_from_slice(&[p[0], p[1], p[2]]);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&rgb)
        .and_then(|_| encoder.finish())
        .map(|image_data| build_pdf(width, height, &image_data))
        .map_err(|e| StitchError::EncodingFailed {
            format: "pdf".into(),
            detail: e.to_string(),
        })
}

fn build_pdf(width: u32, height: u32, image_data: &[u8]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    let mut offsets = [0usize; 6]; // object 0 stays at the free-entry offset

    buf.extend_from_slice(b"%PDF-1.4\n");

    offsets[1] = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    offsets[2] = buf.len();
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

    offsets[3] = buf.len();
    buf.extend_from_slice(
        format!(
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] \
             /Resources << /XObject << /Im1 4 0 R >> >> /Contents 5 0 R >>\nendobj\n"
        )
        .as_bytes(),
    );

    offsets[4] = buf.len();
    buf.extend_from_slice(
        format!(
            "4 0 obj\n<< /Type /XObject /Subtype /Image /Width {width} /Height {height} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode \
             /Length {} >>\nstream\n",
            image_data.len()
        )
        .as_bytes(),
    );
    buf.extend_from_slice(image_data);
    buf.extend_from_slice(b"\nendstream\nendobj\n");

    let contents = format!("q\n{width} 0 0 {height} 0 0 cm\n/Im1 Do\nQ\n");
    offsets[5] = buf.len();
    buf.extend_from_slice(
        format!(
            "5 0 obj\n<< /Length {} >>\nstream\n{contents}endstream\nendobj\n",
            contents.len()
        )
        .as_bytes(),
    );

    let xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 6\n0000000000 65535 f \n");
    for offset in &offsets[1..] {
        buf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(
        format!("trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n")
            .as_bytes(),
    );

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn white_canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, WHITE)
    }

    // ── Path resolution ─────────────────────────────────────────────────

    #[test]
    fn directory_output_gets_timestamped_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = resolve_output_path(tmp.path(), OutputFormat::Png);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("stitched_"), "got: {name}");
        assert!(name.ends_with(".png"));
        // stitched_YYYYMMDD_HHMMSS.png
        assert_eq!(name.len(), "stitched_".len() + 15 + ".png".len());
    }

    #[test]
    fn file_output_gains_missing_extension() {
        let path = resolve_output_path(Path::new("/out/poster"), OutputFormat::Svg);
        assert_eq!(path, PathBuf::from("/out/poster.svg"));
        // A different extension is kept and the format's appended, matching
        // the append-only behaviour for explicit file paths.
        let path = resolve_output_path(Path::new("/out/poster.bak"), OutputFormat::Svg);
        assert_eq!(path, PathBuf::from("/out/poster.bak.svg"));
    }

    #[test]
    fn file_output_with_extension_is_untouched() {
        let path = resolve_output_path(Path::new("/out/poster.SVG"), OutputFormat::Svg);
        assert_eq!(path, PathBuf::from("/out/poster.SVG"));
    }

    // ── PNG ─────────────────────────────────────────────────────────────

    #[test]
    fn png_round_trips_pixel_identical() {
        let mut canvas = white_canvas(20, 30);
        canvas.put_pixel(5, 5, BLACK);
        canvas.put_pixel(19, 29, Rgba([12, 200, 99, 255]));

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("roundtrip.png");
        encode_canvas(&canvas, &path, OutputFormat::Png, SvgStyle::Rects).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (20, 30));
        assert_eq!(decoded.as_raw(), canvas.as_raw());
    }

    // ── SVG ─────────────────────────────────────────────────────────────

    #[test]
    fn svg_paths_emit_single_black_pixel_at_exact_offset() {
        let mut canvas = white_canvas(10, 10);
        canvas.put_pixel(5, 5, BLACK);

        let svg = encode_svg(&canvas, SvgStyle::Paths);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("M5,5h1v1h-1z"));
        assert!(svg.contains("fill=\"#000000\""));
    }

    #[test]
    fn svg_rects_sample_even_coordinates_only() {
        // Odd coordinates fall between samples at half resolution.
        let mut canvas = white_canvas(10, 10);
        canvas.put_pixel(5, 5, BLACK);
        let svg = encode_svg(&canvas, SvgStyle::Rects);
        assert_eq!(svg.matches("<rect").count(), 0);

        // Even coordinates are sampled, and emitted 2×2.
        let mut canvas = white_canvas(10, 10);
        canvas.put_pixel(4, 4, BLACK);
        let svg = encode_svg(&canvas, SvgStyle::Rects);
        assert_eq!(svg.matches("<rect").count(), 1);
        assert!(svg.contains("<rect x=\"4\" y=\"4\" width=\"2\" height=\"2\""));
    }

    #[test]
    fn svg_paths_group_pixels_by_color() {
        let mut canvas = white_canvas(6, 6);
        canvas.put_pixel(1, 1, BLACK);
        canvas.put_pixel(4, 2, BLACK);
        canvas.put_pixel(3, 3, Rgba([200, 0, 0, 255]));

        let svg = encode_svg(&canvas, SvgStyle::Paths);
        // Two colours → two path elements; the black one carries both pixels.
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("M1,1h1v1h-1zM4,2h1v1h-1z"));
        assert!(svg.contains("fill=\"#c80000\""));
    }

    #[test]
    fn svg_skips_near_white_and_transparent_pixels() {
        let mut canvas = white_canvas(4, 4);
        canvas.put_pixel(0, 0, Rgba([254, 253, 255, 255])); // near-white
        canvas.put_pixel(1, 1, Rgba([0, 0, 0, 0])); // transparent
        canvas.put_pixel(2, 2, Rgba([252, 252, 252, 255])); // barely a mark

        let svg = encode_svg(&canvas, SvgStyle::Paths);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("M2,2"));
    }

    #[test]
    fn svg_header_declares_canvas_size() {
        let svg = encode_svg(&white_canvas(123, 45), SvgStyle::Paths);
        assert!(svg.starts_with("<?xml version=\"1.0\""));
        assert!(svg.contains("width=\"123\" height=\"45\" viewBox=\"0 0 123 45\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    // ── EPS ─────────────────────────────────────────────────────────────

    #[test]
    fn eps_header_and_trailer_shape() {
        let eps = encode_eps(&white_canvas(32, 16));
        assert!(eps.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(eps.contains("%%BoundingBox: 0 0 32 16"));
        assert!(eps.contains("32 16 scale"));
        assert!(eps.contains(
            "32 16 8 [1 0 0 -1 0 16] {currentfile 3 32 mul string readhexstring pop} false 3 colorimage"
        ));
        assert!(eps.ends_with("\ngrestore\nshowpage\n%%Trailer\n%%EOF\n"));
    }

    #[test]
    fn eps_payload_is_one_hex_triple_per_pixel() {
        let mut canvas = white_canvas(16, 2);
        canvas.put_pixel(0, 0, BLACK);
        let eps = encode_eps(&canvas);

        let hex_chars = eps
            .lines()
            .filter(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_hexdigit()))
            .map(str::len)
            .sum::<usize>();
        assert_eq!(hex_chars, 16 * 2 * 6);
        assert!(eps.contains("000000ffffff")); // black pixel then white run
    }

    // ── PDF ─────────────────────────────────────────────────────────────

    #[test]
    fn pdf_object_graph_shape() {
        let bytes = encode_pdf(&white_canvas(8, 4)).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Kids [3 0 R]"));
        assert!(text.contains("/MediaBox [0 0 8 4]"));
        assert!(text.contains("/Filter /FlateDecode"));
        assert!(text.contains("/Im1 Do"));
        assert!(text.contains("trailer\n<< /Size 6 /Root 1 0 R >>"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn pdf_image_stream_inflates_to_raw_rgb() {
        let mut canvas = white_canvas(3, 2);
        canvas.put_pixel(0, 0, BLACK);
        canvas.put_pixel(2, 1, Rgba([10, 20, 30, 255]));

        let bytes = encode_pdf(&canvas).unwrap();

        // The image stream is the first stream in the file.
        let start = find(&bytes, b"stream\n").unwrap() + b"stream\n".len();
        let end = find(&bytes[start..], b"\nendstream").unwrap() + start;

        let mut decoder = ZlibDecoder::new(&bytes[start..end]);
        let mut rgb = Vec::new();
        decoder.read_to_end(&mut rgb).unwrap();

        let mut expected = Vec::new();
        for p in canvas.pixels() {
            expected.extend_from_slice(&[p[0], p[1], p[2]]);
        }
        assert_eq!(rgb, expected);
    }

    #[test]
    fn pdf_xref_offsets_point_at_objects() {
        let bytes = encode_pdf(&white_canvas(4, 4)).unwrap();

        // Byte offsets must be checked against the raw bytes: the flate
        // stream is binary, so a lossy string conversion would shift them.
        let xref_at = find(&bytes, b"xref\n").unwrap();
        let tail = std::str::from_utf8(&bytes[xref_at..]).unwrap();

        let entries: Vec<&str> = tail
            .lines()
            .skip(2) // "xref", "0 6"
            .take(6)
            .collect();
        assert_eq!(entries[0], "0000000000 65535 f ");

        for (i, entry) in entries.iter().enumerate().skip(1) {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{i} 0 obj");
            assert_eq!(
                &bytes[offset..offset + expected.len()],
                expected.as_bytes(),
                "object {i} offset mismatch"
            );
        }

        let startxref: usize = tail
            .split("startxref\n")
            .nth(1)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_at);
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|w| w == needle)
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    #[test]
    fn encode_canvas_writes_each_format() {
        let tmp = tempfile::tempdir().unwrap();
        let canvas = white_canvas(6, 6);

        for (format, name) in [
            (OutputFormat::Png, "c.png"),
            (OutputFormat::Svg, "c.svg"),
            (OutputFormat::Ai, "c.ai"),
            (OutputFormat::Pdf, "c.pdf"),
        ] {
            let path = tmp.path().join(name);
            encode_canvas(&canvas, &path, format, SvgStyle::Rects).unwrap();
            assert!(path.exists());
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let canvas = white_canvas(2, 2);
        let result = encode_canvas(
            &canvas,
            Path::new("/definitely/not/a/dir/out.png"),
            OutputFormat::Png,
            SvgStyle::Rects,
        );
        assert!(matches!(
            result,
            Err(StitchError::OutputWriteFailed { .. })
        ));
    }
}
