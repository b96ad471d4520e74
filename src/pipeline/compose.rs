//! Compositing: stack tiles into the final canvas.
//!
//! Pure geometry — by the time tiles reach this stage they are all exactly
//! `box_size` square and fully opaque, so painting order and blending mode
//! cannot change the result. Tiles are painted top-to-bottom in the order
//! given, which the orchestrator guarantees is the input-sorted document
//! order.

use crate::error::StitchError;
use image::{imageops, Rgba, RgbaImage};
use tracing::debug;

/// Stack `tiles` vertically with `spacing` pixels of white between them.
///
/// Canvas width is exactly `box_size`; height is
/// `n·(box_size + spacing) − spacing` — white fill between tiles, none above
/// the first or below the last.
///
/// # Errors
/// [`StitchError::EmptyTileSet`] if `tiles` is empty. (The orchestrator
/// enriches this with a first-error summary before surfacing it.)
pub fn compose_tiles(
    tiles: &[RgbaImage],
    box_size: u32,
    spacing: u32,
) -> Result<RgbaImage, StitchError> {
    if tiles.is_empty() {
        return Err(StitchError::EmptyTileSet {
            total: 0,
            first_error: "no tiles to composite".into(),
        });
    }

    let n = tiles.len() as u32;
    let total_height = n * (box_size + spacing) - spacing;

    let white = Rgba([255u8, 255, 255, 255]);
    let mut canvas = RgbaImage::from_pixel(box_size, total_height, white);

    let mut y = 0i64;
    for tile in tiles {
        imageops::overlay(&mut canvas, tile, 0, y);
        y += (box_size + spacing) as i64;
    }

    debug!("Composited {} tiles into {}x{}", n, box_size, total_height);
    Ok(canvas)
}
