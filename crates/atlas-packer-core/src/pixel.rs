use crate::config::PixelFormat;
use image::{DynamicImage, Rgba, RgbaImage};

/// Width×height raster stored as RGBA8 regardless of format.
///
/// RGB buffers keep every pixel opaque; `has_alpha` records whether the alpha channel carries
/// information (decoded RGB/luma images report `false`, which disables whitespace trimming).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    rgba: RgbaImage,
    format: PixelFormat,
    has_alpha: bool,
}

impl PixelBuffer {
    /// Allocates a cleared buffer: transparent for RGBA, opaque black for RGB.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let fill = match format {
            PixelFormat::Rgba => Rgba([0, 0, 0, 0]),
            PixelFormat::Rgb => Rgba([0, 0, 0, 255]),
        };
        Self {
            rgba: RgbaImage::from_pixel(width, height, fill),
            format,
            has_alpha: format.has_alpha(),
        }
    }

    pub fn from_rgba(rgba: RgbaImage) -> Self {
        Self {
            rgba,
            format: PixelFormat::Rgba,
            has_alpha: true,
        }
    }

    /// Converts a decoded image; the alpha flag follows the decoded color type.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let has_alpha = image.color().has_alpha();
        Self {
            rgba: image.to_rgba8(),
            format: if has_alpha {
                PixelFormat::Rgba
            } else {
                PixelFormat::Rgb
            },
            has_alpha,
        }
    }

    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rgba.dimensions()
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.rgba.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, mut px: Rgba<u8>) {
        if !self.format.has_alpha() {
            px[3] = 255;
        }
        self.rgba.put_pixel(x, y, px);
    }

    /// Alpha at `(x, y)` normalized to `0.0..=1.0`.
    pub fn alpha(&self, x: u32, y: u32) -> f32 {
        self.rgba.get_pixel(x, y)[3] as f32 / 255.0
    }

    /// Copies the `w`×`h` block at `(x, y)` into a new buffer of the same format.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Self {
        let rgba = image::imageops::crop_imm(&self.rgba, x, y, w, h).to_image();
        Self {
            rgba,
            format: self.format,
            has_alpha: self.has_alpha,
        }
    }

    /// Returns the buffer rotated 90° clockwise (width and height swap).
    pub fn rotate90_cw(&self) -> Self {
        Self {
            rgba: image::imageops::rotate90(&self.rgba),
            format: self.format,
            has_alpha: self.has_alpha,
        }
    }

    /// Multiplies color channels by alpha in place.
    pub fn premultiply_alpha(&mut self) {
        for px in self.rgba.pixels_mut() {
            let a = px[3] as u32;
            for c in 0..3 {
                px[c] = ((px[c] as u32 * a + 127) / 255) as u8;
            }
        }
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    /// Converts to an encodable image in this buffer's pixel format.
    pub fn into_dynamic(self) -> DynamicImage {
        match self.format {
            PixelFormat::Rgba => DynamicImage::ImageRgba8(self.rgba),
            PixelFormat::Rgb => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.rgba).to_rgb8()),
        }
    }
}
