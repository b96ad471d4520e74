//! Content-bounds detection: where in the raster the artwork actually is.
//!
//! Extracted pages are mostly margin: a small illustration floating in a sea
//! of white. Cropping on the raw image center would letterbox the whitespace,
//! not the artwork, so the detector finds the artwork first: grayscale →
//! Sobel gradient magnitude → threshold → bounding rectangle of the edge
//! pixels, padded by a fixed margin and clamped to the image.
//!
//! Edge intensity is a better content signal than raw luminance here because
//! artwork on light stock can itself be light; what it always has is
//! *structure*, and structure shows up as gradient.

use image::{imageops, GrayImage, Luma, RgbaImage};

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_THRESHOLD: u8 = 50;

/// Padding added to each side of the detected rectangle, in pixels.
const MARGIN: u32 = 20;

/// The rectangle believed to contain the image's visible artwork.
///
/// Half-open on both axes: `min` is the first contained pixel column/row,
/// `max` the first excluded one, so `width() == max_x - min_x`. Always
/// contained in the extent of the image it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl ContentBounds {
    /// Whole-image bounds for a `width`×`height` raster.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width,
            max_y: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// Midpoint of the rectangle, in the source image's coordinate space.
    pub fn center(&self) -> (u32, u32) {
        ((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }
}

/// Detect the content rectangle of `img`.
///
/// Never fails and never returns a degenerate rectangle: when no pixel
/// clears the edge threshold (uniform images, or images too small to hold an
/// interior pixel), the whole image is the content. A blank page therefore
/// yields a centered crop of itself rather than an inverted rectangle.
pub fn detect_bounds(img: &RgbaImage) -> ContentBounds {
    let gray = imageops::grayscale(img);
    let edges = sobel_magnitude(&gray);
    let (width, height) = edges.dimensions();

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] > EDGE_THRESHOLD {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found {
        return ContentBounds::full(width, height);
    }

    ContentBounds {
        min_x: min_x.saturating_sub(MARGIN),
        min_y: min_y.saturating_sub(MARGIN),
        max_x: (max_x + MARGIN).min(width),
        max_y: (max_y + MARGIN).min(height),
    }
}

/// Sobel gradient magnitude with the standard 3×3 kernels.
///
/// Interior pixels only; the 1-pixel border stays zero. Magnitude is
/// `clamp(0.5·(gx² + gy²), 0, 255)` — the squared-gradient form keeps the
/// response hot enough to clear the threshold on soft edges without a sqrt.
fn sobel_magnitude(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut edges = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return edges;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let p = |dx: i64, dy: i64| -> i64 {
                let px = (x as i64 + dx) as u32;
                let py = (y as i64 + dy) as u32;
                gray.get_pixel(px, py)[0] as i64
            };

            let gx = p(1, -1) + 2 * p(1, 0) + p(1, 1) - p(-1, -1) - 2 * p(-1, 0) - p(-1, 1);
            let gy = p(-1, 1) + 2 * p(0, 1) + p(1, 1) - p(-1, -1) - 2 * p(0, -1) - p(1, -1);

            let magnitude = ((gx * gx + gy * gy) as f64 * 0.5).min(255.0) as u8;
            edges.put_pixel(x, y, Luma([magnitude]));
        }
    }

    edges
}
