use crate::config::{GUARD_PIXEL, PixelFormat, Settings};
use crate::error::{AtlasError, Result};
use crate::model::{PageResult, SourceImage};
use crate::pixel::PixelBuffer;
use image::Rgba;

/// Copy `src` into `canvas` with its top-left at `(dx, dy)`, optionally rotated 90° clockwise.
///
/// When rotated, the written block is `src.height()` wide and `src.width()` tall. Pixels falling
/// outside the canvas are dropped.
pub fn blit(src: &PixelBuffer, canvas: &mut PixelBuffer, dx: u32, dy: u32, rotated: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let (rw, rh) = if rotated { (sh, sw) } else { (sw, sh) };

    for yy in 0..rh {
        for xx in 0..rw {
            let (ix, iy) = if rotated { (yy, sh - 1 - xx) } else { (xx, yy) };
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, src.get_pixel(ix, iy));
            }
        }
    }
}

/// Renders one page: every region's source is copied to its bounds (rotated when flagged), colors
/// are premultiplied when requested, and the guard pixel is stamped last.
///
/// `sources` is indexed by each region's `original_index`.
pub fn composite(
    page: &PageResult,
    sources: &[SourceImage],
    settings: &Settings,
) -> Result<PixelBuffer> {
    let mut canvas = PixelBuffer::new(page.width, page.height, settings.pixel_format);
    for region in &page.regions {
        let source = sources.get(region.original_index).ok_or_else(|| {
            AtlasError::InvalidInput(format!(
                "region '{}' refers to missing source #{}",
                region.name, region.original_index
            ))
        })?;
        let (sw, sh) = source.pixels.dimensions();
        let expected = if region.is_rotated { (sh, sw) } else { (sw, sh) };
        if expected != (region.width, region.height) {
            return Err(AtlasError::InvalidInput(format!(
                "region '{}' is {}x{} but its source renders {}x{}",
                region.name, region.width, region.height, expected.0, expected.1
            )));
        }
        blit(&source.pixels, &mut canvas, region.x, region.y, region.is_rotated);
    }

    if settings.premultiplied_alpha && settings.pixel_format == PixelFormat::Rgba {
        canvas.premultiply_alpha();
    }

    if settings.algorithm_settings.add_white_pixel {
        let (gx, gy) = GUARD_PIXEL;
        if gx < page.width && gy < page.height {
            canvas.put_pixel(gx, gy, Rgba([255, 255, 255, 255]));
        }
    }
    Ok(canvas)
}
