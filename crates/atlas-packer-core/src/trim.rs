use crate::config::Settings;
use crate::pixel::PixelBuffer;

/// Number of whitespace pixels on each side as `[left, top, right, bottom]`.
///
/// A column/row is whitespace when every pixel in it has normalized alpha `<= threshold`.
/// Columns are scanned first over the full height; rows are then scanned only across the
/// surviving column range. Buffers without an alpha channel are never trimmed, and a buffer with
/// no surviving pixel is capped to the 1×1 image at its origin.
pub fn compute_trim(buffer: &PixelBuffer, threshold: f32) -> [u32; 4] {
    let (w, h) = buffer.dimensions();
    if !buffer.has_alpha() || w == 0 || h == 0 {
        return [0; 4];
    }
    let column_clear = |x: u32| (0..h).all(|y| buffer.alpha(x, y) <= threshold);

    // left
    let mut x1 = 0;
    while x1 < w && column_clear(x1) {
        x1 += 1;
    }
    if x1 >= w {
        return [0, 0, w - 1, h - 1];
    }
    // right
    let mut x2 = w - 1;
    while x2 > x1 && column_clear(x2) {
        x2 -= 1;
    }

    let row_clear = |y: u32| (x1..=x2).all(|x| buffer.alpha(x, y) <= threshold);
    // top
    let mut y1 = 0;
    while y1 < h && row_clear(y1) {
        y1 += 1;
    }
    // bottom
    let mut y2 = h - 1;
    while y2 > y1 && row_clear(y2) {
        y2 -= 1;
    }

    [x1, y1, w - 1 - x2, h - 1 - y2]
}

/// Applies whitespace stripping per `settings`, returning the (possibly cropped) buffer and the
/// trimmed amounts. The source buffer is never modified; a trimmed result is a fresh copy.
pub fn strip_whitespace(buffer: PixelBuffer, settings: &Settings) -> (PixelBuffer, [u32; 4]) {
    if !settings.strip_whitespace {
        return (buffer, [0; 4]);
    }
    let padding = compute_trim(&buffer, settings.alpha_threshold);
    if padding == [0; 4] {
        return (buffer, padding);
    }
    let [left, top, right, bottom] = padding;
    let (w, h) = buffer.dimensions();
    let cropped = buffer.crop(left, top, w - left - right, h - top - bottom);
    (cropped, padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn transparent(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]))
    }

    #[test]
    fn opaque_block_in_the_middle() {
        let mut img = transparent(10, 10);
        for y in 3..7 {
            for x in 3..7 {
                img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }
        let buf = PixelBuffer::from_rgba(img);
        assert_eq!(compute_trim(&buf, 0.0), [3, 3, 3, 3]);
    }

    #[test]
    fn threshold_treats_faint_pixels_as_whitespace() {
        let mut img = transparent(6, 6);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 10]));
        img.put_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let buf = PixelBuffer::from_rgba(img);
        assert_eq!(compute_trim(&buf, 0.0), [0, 0, 1, 1]);
        assert_eq!(compute_trim(&buf, 0.1), [4, 4, 1, 1]);
    }

    #[test]
    fn fully_transparent_keeps_one_pixel() {
        let buf = PixelBuffer::from_rgba(transparent(5, 3));
        assert_eq!(compute_trim(&buf, 0.0), [0, 0, 4, 2]);
    }

    #[test]
    fn no_alpha_channel_is_never_trimmed() {
        let rgb = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        let buf = PixelBuffer::from_dynamic(image::DynamicImage::ImageRgb8(rgb));
        assert!(!buf.has_alpha());
        assert_eq!(compute_trim(&buf, 1.0), [0; 4]);
    }

    #[test]
    fn single_pass_reaches_tight_bounds_on_l_shapes() {
        // L-shaped mask: a vertical bar in column 2 (rows 1..=7) and a horizontal bar in row 7
        // (columns 2..=6). One column pass followed by one row pass already yields the tight
        // bounding box, so the passes are not iterated.
        let mut img = transparent(9, 9);
        for y in 1..=7 {
            img.put_pixel(2, y, Rgba([0, 0, 0, 255]));
        }
        for x in 2..=6 {
            img.put_pixel(x, 7, Rgba([0, 0, 0, 255]));
        }
        let buf = PixelBuffer::from_rgba(img);
        let once = compute_trim(&buf, 0.0);
        assert_eq!(once, [2, 1, 2, 1]);

        let [l, t, r, b] = once;
        let cropped = buf.crop(l, t, 9 - l - r, 9 - t - b);
        assert_eq!(compute_trim(&cropped, 0.0), [0; 4]);
    }

    #[test]
    fn strip_disabled_returns_input_untouched() {
        let buf = PixelBuffer::from_rgba(transparent(4, 4));
        let settings = Settings::default();
        let (out, pad) = strip_whitespace(buf.clone(), &settings);
        assert_eq!(pad, [0; 4]);
        assert_eq!(out, buf);
    }

    #[test]
    fn strip_crops_to_surviving_rect() {
        let mut img = transparent(8, 5);
        img.put_pixel(2, 1, Rgba([1, 2, 3, 255]));
        img.put_pixel(5, 3, Rgba([4, 5, 6, 255]));
        let settings = Settings::builder().strip_whitespace(true).build();
        let (out, pad) = strip_whitespace(PixelBuffer::from_rgba(img), &settings);
        assert_eq!(pad, [2, 1, 2, 1]);
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
        assert_eq!(out.get_pixel(3, 2), Rgba([4, 5, 6, 255]));
    }
}
