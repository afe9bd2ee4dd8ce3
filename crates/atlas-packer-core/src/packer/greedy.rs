//! Greedy shelf packing: rows filled left to right, pages filled top to bottom.

use super::PageLayout;
use crate::error::Result;
use crate::model::{Rect, Rectangle};
use tracing::{debug, trace};

/// Insertion cursor of the current page.
#[derive(Debug, Clone, Copy)]
struct ShelfCursor {
    region: Rect,
    x: u32,
    /// Top of the current row.
    y: u32,
    row_height: u32,
    /// Set once the row's first item fixed its height.
    row_locked: bool,
    /// Number of real items placed on this page.
    placed: usize,
}

impl ShelfCursor {
    fn new(layout: &PageLayout) -> Self {
        let region = layout.region;
        let mut cursor = Self {
            region,
            x: region.x,
            y: region.y,
            row_height: 0,
            row_locked: false,
            placed: 0,
        };
        // the reserved corner sits at the start of row 0 without fixing its height
        if let Some(corner) = layout.corner {
            cursor.x = corner.right_ex();
            cursor.row_height = corner.bottom_ex() - region.y;
        }
        cursor
    }

    fn fits_row(&self, w: u32, h: u32) -> bool {
        self.x + w <= self.region.right_ex()
            && self.y + h <= self.region.bottom_ex()
            && (!self.row_locked || h <= self.row_height)
    }

    fn advance(&mut self, w: u32, h: u32) -> (u32, u32) {
        let pos = (self.x, self.y);
        self.x += w;
        if !self.row_locked {
            self.row_height = self.row_height.max(h);
            self.row_locked = true;
        }
        self.placed += 1;
        pos
    }

    /// Unrotated first; rotation only when the unrotated form does not fit this row.
    fn try_row(&mut self, fit: (u32, u32), rotated: Option<(u32, u32)>) -> Option<(u32, u32, bool)> {
        let (w, h) = fit;
        if self.fits_row(w, h) {
            let (x, y) = self.advance(w, h);
            return Some((x, y, false));
        }
        if let Some((rw, rh)) = rotated.filter(|&(rw, rh)| self.fits_row(rw, rh)) {
            let (x, y) = self.advance(rw, rh);
            return Some((x, y, true));
        }
        None
    }

    fn next_row(&mut self) {
        self.y += self.row_height;
        self.x = self.region.x;
        self.row_height = 0;
        self.row_locked = false;
    }

    /// Places a footprint in the current row or a new row; `None` means the page is full.
    fn place(&mut self, fit: (u32, u32), rotated: Option<(u32, u32)>) -> Option<(u32, u32, bool)> {
        if let Some(p) = self.try_row(fit, rotated) {
            return Some(p);
        }
        if self.row_height == 0 {
            return None;
        }
        self.next_row();
        self.try_row(fit, rotated)
    }
}

fn place_on(cursor: &mut ShelfCursor, mut rect: Rectangle, layout: &PageLayout) -> Option<Rectangle> {
    let rotated_fit = layout
        .allow_rotation
        .then(|| layout.rotated_footprint(&rect));
    let (x, y, rotated) = cursor.place(layout.footprint(&rect), rotated_fit)?;
    if rotated {
        rect.toggle_rotation();
    }
    rect.x = x;
    rect.y = y;
    trace!(name = %rect.name, x, y, rotated, "placed");
    Some(rect)
}

/// Packs pre-sorted rectangles shelf by shelf; a full page is closed and never revisited.
pub fn pack(sorted: Vec<Rectangle>, layout: &PageLayout) -> Result<Vec<Vec<Rectangle>>> {
    let mut pages: Vec<Vec<Rectangle>> = Vec::new();
    let mut current: Vec<Rectangle> = Vec::new();
    let mut cursor = ShelfCursor::new(layout);
    for rect in sorted {
        if let Some(placed) = place_on(&mut cursor, rect.clone(), layout) {
            current.push(placed);
            continue;
        }
        if cursor.placed == 0 {
            return Err(layout.too_large(&rect));
        }
        pages.push(std::mem::take(&mut current));
        cursor = ShelfCursor::new(layout);
        debug!(page = pages.len(), "opened page");
        match place_on(&mut cursor, rect.clone(), layout) {
            Some(placed) => current.push(placed),
            None => return Err(layout.too_large(&rect)),
        }
    }
    if !current.is_empty() {
        pages.push(current);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlgorithmSettings;

    fn layout(f: impl FnOnce(&mut AlgorithmSettings)) -> PageLayout {
        let mut a = AlgorithmSettings {
            padding_x: 0,
            padding_y: 0,
            page_max_width: 10,
            page_max_height: 10,
            ..Default::default()
        };
        f(&mut a);
        PageLayout::new(&a)
    }

    fn rects(sizes: &[(u32, u32)]) -> Vec<Rectangle> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| Rectangle::new(format!("r{i}"), i, w, h))
            .collect()
    }

    #[test]
    fn fills_rows_then_opens_new_row() {
        let pages = pack(rects(&[(4, 4), (4, 3), (4, 2)]), &layout(|_| {})).expect("pack");
        assert_eq!(pages.len(), 1);
        let pos: Vec<(u32, u32)> = pages[0].iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(pos, vec![(0, 0), (4, 0), (0, 4)]);
    }

    #[test]
    fn rotation_used_only_when_unrotated_misses_row() {
        // row 0 is 6 tall after the first item; 4 px of width remain. A 6x3 item only fits rotated.
        let l = layout(|a| a.allow_rotation = true);
        let pages = pack(rects(&[(6, 6), (6, 3)]), &l).expect("pack");
        let second = &pages[0][1];
        assert!(second.is_rotated);
        assert_eq!((second.x, second.y, second.width, second.height), (6, 0, 3, 6));
    }

    #[test]
    fn rotated_items_keep_horizontal_gutter() {
        let l = layout(|a| {
            a.allow_rotation = true;
            a.padding_x = 4;
            a.page_max_width = 100;
        });
        let pages = pack(rects(&[(2, 12), (2, 12)]), &l).expect("pack");
        let (a, b) = (&pages[0][0], &pages[0][1]);
        assert!(a.is_rotated && b.is_rotated);
        assert_eq!((a.x, a.width), (0, 12));
        assert_eq!(b.x, 16);
    }

    #[test]
    fn new_page_when_height_exhausted() {
        let pages = pack(rects(&[(10, 6), (10, 6)]), &layout(|_| {})).expect("pack");
        assert_eq!(pages.len(), 2);
        assert_eq!((pages[1][0].x, pages[1][0].y), (0, 0));
    }

    #[test]
    fn guard_corner_shifts_first_item() {
        let l = layout(|a| a.add_white_pixel = true);
        let pages = pack(rects(&[(5, 5), (10, 4)]), &l).expect("pack");
        assert_eq!((pages[0][0].x, pages[0][0].y), (1, 0));
        assert_eq!((pages[0][1].x, pages[0][1].y), (0, 5));
    }
}
