//! Smart cropping: one fixed-size, letterboxed tile per document.
//!
//! The crop window is shaped like the detected content (so the artwork's
//! aspect ratio survives) but never larger than the tile box, and it is
//! centered on the content's midpoint rather than the image's. The window is
//! then pasted centered onto a white square. Content is letterboxed, never
//! stretched: a wide logo gets white bands above and below, a tall one gets
//! them left and right.

use crate::pipeline::bounds::ContentBounds;
use image::{Rgba, RgbaImage};

/// Crop `src` around the detected content into a `box_size`×`box_size` tile.
///
/// The output is always exactly `box_size` square. Source coordinates
/// outside the image (the crop window may overhang when content sits near a
/// border, or when the source is smaller than the box) are left white rather
/// than read — out-of-range access degrades to blank pixels, it never
/// faults.
pub fn smart_crop(src: &RgbaImage, bounds: &ContentBounds, box_size: u32) -> RgbaImage {
    let (center_x, center_y) = bounds.center();

    // Shape the crop window like the content, capped at the box.
    let content_ratio = bounds.width().max(1) as f64 / bounds.height().max(1) as f64;
    let (crop_w, crop_h) = if content_ratio > 1.0 {
        (box_size, (box_size as f64 / content_ratio) as u32)
    } else {
        ((box_size as f64 * content_ratio) as u32, box_size)
    };
    let crop_w = crop_w.min(box_size);
    let crop_h = crop_h.min(box_size);

    // Window origin may be negative when the content hugs a border.
    let crop_min_x = center_x as i64 - (crop_w / 2) as i64;
    let crop_min_y = center_y as i64 - (crop_h / 2) as i64;

    let white = Rgba([255u8, 255, 255, 255]);
    let mut tile = RgbaImage::from_pixel(box_size, box_size, white);

    let offset_x = (box_size - crop_w) / 2;
    let offset_y = (box_size - crop_h) / 2;

    let (src_w, src_h) = (src.width() as i64, src.height() as i64);
    for y in 0..crop_h {
        for x in 0..crop_w {
            let src_x = crop_min_x + x as i64;
            let src_y = crop_min_y + y as i64;
            if (0..src_w).contains(&src_x) && (0..src_h).contains(&src_y) {
                let pixel = *src.get_pixel(src_x as u32, src_y as u32);
                tile.put_pixel(offset_x + x, offset_y + y, pixel);
            }
        }
    }

    tile
}
