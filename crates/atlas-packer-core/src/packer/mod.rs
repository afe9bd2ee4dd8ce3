//! Rectangle packing.
//!
//! Both strategies share the same pre/post-processing:
//! - each rectangle occupies a footprint of `width + padding_x` by `height + padding_y`
//!   (the gutter trails the visual pixels to the right and bottom);
//! - without edge padding the packable region is `[0, max + padding)` so the trailing gutter of
//!   the last column/row may fall off the page; with edge padding it is `[padding, max)` so every
//!   edge keeps a full gutter;
//! - with `add_white_pixel` the guard pixel (plus gutter) is reserved on every page before any
//!   placement;
//! - page sizes shrink to the visual extent, then round up to a power of two when requested.

use crate::config::{AlgorithmSettings, GUARD_PIXEL, PackAlgorithm, Settings};
use crate::error::{AtlasError, Result};
use crate::model::{PageResult, Rect, Rectangle};
use tracing::{debug, instrument};

pub mod greedy;
pub mod maxrects;

/// Page geometry derived from [`AlgorithmSettings`], shared by both strategies.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Area that placement footprints must stay inside.
    pub region: Rect,
    /// Footprint reserved for the guard pixel, if any.
    pub corner: Option<Rect>,
    pub padding_x: u32,
    pub padding_y: u32,
    pub allow_rotation: bool,
    pub max_width: u32,
    pub max_height: u32,
    edge_padding: bool,
    power_of_two: bool,
    add_white_pixel: bool,
}

impl PageLayout {
    pub fn new(a: &AlgorithmSettings) -> Self {
        let region = if a.edge_padding {
            Rect::new(
                a.padding_x,
                a.padding_y,
                a.page_max_width.saturating_sub(a.padding_x),
                a.page_max_height.saturating_sub(a.padding_y),
            )
        } else {
            Rect::new(
                0,
                0,
                a.page_max_width.saturating_add(a.padding_x),
                a.page_max_height.saturating_add(a.padding_y),
            )
        };
        let (gx, gy) = GUARD_PIXEL;
        let corner = (a.add_white_pixel && region.contains(&Rect::new(gx, gy, 1, 1)))
            .then(|| Rect::new(gx, gy, 1 + a.padding_x, 1 + a.padding_y));
        Self {
            region,
            corner,
            padding_x: a.padding_x,
            padding_y: a.padding_y,
            allow_rotation: a.allow_rotation,
            max_width: a.page_max_width,
            max_height: a.page_max_height,
            edge_padding: a.edge_padding,
            power_of_two: a.power_of_two,
            add_white_pixel: a.add_white_pixel,
        }
    }

    /// Padded size of `rect` in its current orientation.
    pub fn footprint(&self, rect: &Rectangle) -> (u32, u32) {
        self.padded(rect.width, rect.height)
    }

    /// Padded size of `rect` turned 90°. The gutters stay on their page axes.
    pub fn rotated_footprint(&self, rect: &Rectangle) -> (u32, u32) {
        self.padded(rect.height, rect.width)
    }

    fn padded(&self, w: u32, h: u32) -> (u32, u32) {
        (w.saturating_add(self.padding_x), h.saturating_add(self.padding_y))
    }

    /// Free space of a page before anything is placed: the region minus the reserved corner.
    pub fn empty_free_list(&self) -> Vec<Rect> {
        let mut page = maxrects::MaxRectsPage::new(self);
        std::mem::take(&mut page.free)
    }

    /// True if a `w`×`h` image, padded, fits an empty page in either allowed orientation.
    pub fn fits_empty_page(&self, w: u32, h: u32) -> bool {
        let (fw, fh) = self.padded(w, h);
        let (rw, rh) = self.padded(h, w);
        self.empty_free_list().iter().any(|fr| {
            (fr.w >= fw && fr.h >= fh) || (self.allow_rotation && fr.w >= rw && fr.h >= rh)
        })
    }

    pub(crate) fn too_large(&self, rect: &Rectangle) -> AtlasError {
        let (w, h) = self.footprint(rect);
        AtlasError::Packing {
            name: rect.name.clone(),
            width: w,
            height: h,
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }

    /// Final page dimensions for the given placed regions.
    pub fn page_size(&self, regions: &[Rectangle]) -> (u32, u32) {
        let (trail_x, trail_y) = if self.edge_padding {
            (self.padding_x, self.padding_y)
        } else {
            (0, 0)
        };
        let mut page_w = 1u32;
        let mut page_h = 1u32;
        if self.add_white_pixel {
            page_w = page_w.max(GUARD_PIXEL.0 + 1);
            page_h = page_h.max(GUARD_PIXEL.1 + 1);
        }
        for r in regions {
            page_w = page_w.max(r.x + r.width + trail_x);
            page_h = page_h.max(r.y + r.height + trail_y);
        }
        if self.power_of_two {
            page_w = next_pow2(page_w);
            page_h = next_pow2(page_h);
        }
        (page_w, page_h)
    }
}

fn next_pow2(v: u32) -> u32 {
    v.max(1).next_power_of_two()
}

/// Deterministic processing order: height desc, then width desc, then input position.
pub fn sort_for_packing(rects: &mut [Rectangle]) {
    // stable: equal keys keep input order
    rects.sort_by(|a, b| b.height.cmp(&a.height).then_with(|| b.width.cmp(&a.width)));
}

/// Packs `rectangles` into as many pages as needed using `settings.pack_algorithm`.
///
/// Input rectangles must be unrotated and unplaced. The result is deterministic for a given input
/// order and settings. Fails with [`AtlasError::Packing`] (and returns no pages) if any single
/// rectangle cannot fit an empty page in any allowed orientation.
#[instrument(skip_all, fields(count = rectangles.len(), algorithm = ?settings.pack_algorithm))]
pub fn pack_rectangles(
    mut rectangles: Vec<Rectangle>,
    settings: &Settings,
) -> Result<Vec<PageResult>> {
    settings.validate()?;
    let layout = PageLayout::new(&settings.algorithm_settings);

    for r in &rectangles {
        if r.width == 0 || r.height == 0 {
            return Err(AtlasError::InvalidInput(format!(
                "rectangle '{}' has zero size ({}x{})",
                r.name, r.width, r.height
            )));
        }
        if !layout.fits_empty_page(r.width, r.height) {
            return Err(layout.too_large(r));
        }
    }

    sort_for_packing(&mut rectangles);

    let placed = match settings.pack_algorithm {
        PackAlgorithm::Best => maxrects::pack(rectangles, &layout)?,
        PackAlgorithm::Greedy => greedy::pack(rectangles, &layout)?,
    };

    let pages: Vec<PageResult> = placed
        .into_iter()
        .map(|regions| {
            let (width, height) = layout.page_size(&regions);
            PageResult {
                width,
                height,
                regions,
            }
        })
        .collect();
    debug!(pages = pages.len(), "packing finished");
    Ok(pages)
}
