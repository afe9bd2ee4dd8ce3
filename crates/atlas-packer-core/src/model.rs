use crate::config::{PixelFormat, Settings, TextureFilter};
use crate::pixel::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right_ex(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom_ex(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x
            && r.y >= self.y
            && r.right_ex() <= self.right_ex()
            && r.bottom_ex() <= self.bottom_ex()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right_ex()
            || r.x >= self.right_ex()
            || self.y >= r.bottom_ex()
            || r.y >= self.bottom_ex())
    }
}

/// Packer input/output unit.
///
/// `width`/`height` are the stored (post-rotation) visual dimensions; `x`/`y`/`is_rotated` are
/// assigned by the packer. `original_index` points back into the source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub width: u32,
    pub height: u32,
    pub original_index: usize,
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub is_rotated: bool,
}

impl Rectangle {
    pub fn new(name: impl Into<String>, original_index: usize, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            original_index,
            name: name.into(),
            x: 0,
            y: 0,
            is_rotated: false,
        }
    }

    /// Flips the rotation flag and swaps the stored dimensions; area is unchanged.
    pub fn toggle_rotation(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        self.is_rotated = !self.is_rotated;
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Placements for one page. Region bounds exclude padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub width: u32,
    pub height: u32,
    pub regions: Vec<Rectangle>,
}

/// Optional per-image sidecar, e.g. `button.png.json` = `{"splits": [4, 4, 12, 12]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// 9-slice split lines `[left, top, right, bottom]` in source-local pixels.
    pub splits: [f32; 4],
}

/// One discovered source image.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    /// `/`-separated path relative to the input root, extension included.
    pub relative_path: String,
    pub pixels: PixelBuffer,
    pub metadata: Option<ImageMetadata>,
    /// `[left, top, right, bottom]` pixels removed by whitespace stripping.
    pub padding: [u32; 4],
}

impl SourceImage {
    /// In-memory source with no sidecar metadata.
    pub fn new(relative_path: impl Into<String>, pixels: PixelBuffer) -> Self {
        let relative_path = relative_path.into();
        Self {
            path: PathBuf::from(&relative_path),
            relative_path,
            pixels,
            metadata: None,
            padding: [0; 4],
        }
    }

    pub fn with_metadata(mut self, metadata: Option<ImageMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Region name: the relative path without its file extension.
    pub fn name(&self) -> String {
        match self.relative_path.rfind('.') {
            Some(dot) if !self.relative_path[dot..].contains('/') && dot > 0 => {
                self.relative_path[..dot].to_string()
            }
            _ => self.relative_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Final addressing record of one source image inside a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasRegionDescriptor {
    pub name: String,
    /// Visual pixels only; gutter and trimmed whitespace excluded.
    pub bounds: Bounds,
    pub is_rotated: bool,
    pub splits: Option<[f32; 4]>,
    pub padding: [u32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasPageDescriptor {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub premultiplied_alpha: bool,
    pub filter_min: TextureFilter,
    pub filter_mag: TextureFilter,
    pub has_white_pixel: bool,
    pub regions: Vec<AtlasRegionDescriptor>,
}

/// A composited page and its descriptor.
#[derive(Debug, Clone)]
pub struct AtlasPage {
    pub pixels: PixelBuffer,
    pub descriptor: AtlasPageDescriptor,
}

/// Output of one pack invocation; owned entirely by the caller.
#[derive(Debug, Clone)]
pub struct PackedResult {
    pub pages: Vec<AtlasPage>,
    pub settings: Settings,
}

impl PackedResult {
    /// Looks a region up by name across all pages, returning `(page index, region)`.
    pub fn find_region(&self, name: &str) -> Option<(usize, &AtlasRegionDescriptor)> {
        self.pages.iter().enumerate().find_map(|(i, p)| {
            p.descriptor
                .regions
                .iter()
                .find(|r| r.name == name)
                .map(|r| (i, r))
        })
    }

    /// Computes packing statistics for this result.
    pub fn stats(&self) -> PackStats {
        let num_pages = self.pages.len();
        let mut num_regions = 0;
        let mut total_page_area = 0u64;
        let mut used_region_area = 0u64;
        let mut max_page_width = 0u32;
        let mut max_page_height = 0u32;
        let mut num_rotated = 0;
        let mut num_trimmed = 0;

        for page in &self.pages {
            let d = &page.descriptor;
            total_page_area += (d.width as u64) * (d.height as u64);
            max_page_width = max_page_width.max(d.width);
            max_page_height = max_page_height.max(d.height);

            for r in &d.regions {
                num_regions += 1;
                used_region_area += (r.bounds.width as u64) * (r.bounds.height as u64);
                if r.is_rotated {
                    num_rotated += 1;
                }
                if r.padding != [0; 4] {
                    num_trimmed += 1;
                }
            }
        }

        let occupancy = if total_page_area > 0 {
            used_region_area as f64 / total_page_area as f64
        } else {
            0.0
        };

        PackStats {
            num_pages,
            num_regions,
            total_page_area,
            used_region_area,
            occupancy,
            max_page_width,
            max_page_height,
            num_rotated,
            num_trimmed,
        }
    }
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_pages: usize,
    pub num_regions: usize,
    /// Sum of page `width * height`.
    pub total_page_area: u64,
    /// Sum of region `width * height`.
    pub used_region_area: u64,
    /// `used_region_area / total_page_area` (0.0 to 1.0).
    pub occupancy: f64,
    pub max_page_width: u32,
    pub max_page_height: u32,
    pub num_rotated: usize,
    /// Regions with any whitespace stripped.
    pub num_trimmed: usize,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Regions: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Rotated: {}, Trimmed: {}",
            self.num_pages,
            self.num_regions,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_region_area,
            self.num_rotated,
            self.num_trimmed,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_region_area)
    }
}
