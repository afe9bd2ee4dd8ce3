//! Best-fit packing over maximal free rectangles (MaxRects, best-area-fit).

use super::PageLayout;
use crate::error::Result;
use crate::model::{Rect, Rectangle};
use tracing::{debug, trace};

/// Free space and placements of a single page.
pub struct MaxRectsPage {
    pub(crate) free: Vec<Rect>,
    placed: Vec<Rectangle>,
}

/// Ordering key for a candidate: leftover area, shorter leftover side, free-rect y, free-rect x,
/// then unrotated before rotated.
type Score = (u64, u32, u32, u32, bool);

impl MaxRectsPage {
    pub fn new(layout: &PageLayout) -> Self {
        let mut page = Self {
            free: vec![layout.region],
            placed: Vec::new(),
        };
        if let Some(corner) = layout.corner {
            page.place_rect(&corner);
        }
        page
    }

    fn score(fr: &Rect, w: u32, h: u32, rotated: bool) -> Score {
        let leftover_area = fr.area() - (w as u64 * h as u64);
        let short_fit = (fr.w - w).min(fr.h - h);
        (leftover_area, short_fit, fr.y, fr.x, rotated)
    }

    /// Best placement of the unrotated footprint `fit` or, when given, the `rotated` one.
    /// The returned rect is the chosen footprint.
    pub fn find_position(
        &self,
        fit: (u32, u32),
        rotated: Option<(u32, u32)>,
    ) -> Option<(Rect, bool)> {
        let (w, h) = fit;
        let mut best: Option<(Score, Rect, bool)> = None;
        let mut consider = |score: Score, rect: Rect, rotated: bool| {
            if best.as_ref().is_none_or(|(s, _, _)| score < *s) {
                best = Some((score, rect, rotated));
            }
        };
        for fr in &self.free {
            if fr.w >= w && fr.h >= h {
                consider(Self::score(fr, w, h, false), Rect::new(fr.x, fr.y, w, h), false);
            }
            if let Some((rw, rh)) = rotated.filter(|&(rw, rh)| fr.w >= rw && fr.h >= rh) {
                consider(Self::score(fr, rw, rh, true), Rect::new(fr.x, fr.y, rw, rh), true);
            }
        }
        best.map(|(_, rect, rotated)| (rect, rotated))
    }

    /// Marks `node` as used: every intersecting free rect is replaced by its maximal leftovers,
    /// then contained free rects are pruned.
    pub fn place_rect(&mut self, node: &Rect) {
        let mut new_free: Vec<Rect> = Vec::new();
        let mut i = 0usize;
        while i < self.free.len() {
            let fr = self.free[i];
            if fr.intersects(node) {
                self.free.swap_remove(i);
                Self::split_free_node(fr, node, &mut new_free);
            } else {
                i += 1;
            }
        }
        self.free.extend(new_free);
        self.prune_free_list();
    }

    fn split_free_node(fr: Rect, node: &Rect, out: &mut Vec<Rect>) {
        let fr_x2 = fr.right_ex();
        let fr_y2 = fr.bottom_ex();
        let n_x2 = node.right_ex();
        let n_y2 = node.bottom_ex();

        // Left
        if node.x > fr.x {
            out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
        }
        // Right
        if n_x2 < fr_x2 {
            out.push(Rect::new(n_x2, fr.y, fr_x2 - n_x2, fr.h));
        }
        // Top
        if node.y > fr.y {
            out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
        }
        // Bottom
        if n_y2 < fr_y2 {
            out.push(Rect::new(fr.x, n_y2, fr.w, fr_y2 - n_y2));
        }
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let a = self.free[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let b = self.free[j];
                if b.contains(&a) {
                    remove_i = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn free_list_len(&self) -> usize {
        self.free.len()
    }

    /// Places `rect` if any free rect admits it, recording the placement.
    fn insert(&mut self, mut rect: Rectangle, layout: &PageLayout) -> Option<Rectangle> {
        let rotated_fit = layout
            .allow_rotation
            .then(|| layout.rotated_footprint(&rect));
        let (node, rotated) = self.find_position(layout.footprint(&rect), rotated_fit)?;
        self.place_rect(&node);
        if rotated {
            rect.toggle_rotation();
        }
        rect.x = node.x;
        rect.y = node.y;
        trace!(name = %rect.name, x = rect.x, y = rect.y, rotated, "placed");
        self.placed.push(rect.clone());
        Some(rect)
    }
}

/// Packs pre-sorted rectangles page by page; a page is closed as soon as an item does not fit it.
pub fn pack(sorted: Vec<Rectangle>, layout: &PageLayout) -> Result<Vec<Vec<Rectangle>>> {
    let mut pages: Vec<Vec<Rectangle>> = Vec::new();
    let mut page = MaxRectsPage::new(layout);
    for rect in sorted {
        if page.insert(rect.clone(), layout).is_some() {
            continue;
        }
        if page.placed.is_empty() {
            return Err(layout.too_large(&rect));
        }
        let full = std::mem::replace(&mut page, MaxRectsPage::new(layout));
        pages.push(full.placed);
        debug!(page = pages.len(), "opened page");
        if page.insert(rect.clone(), layout).is_none() {
            return Err(layout.too_large(&rect));
        }
    }
    if !page.placed.is_empty() {
        pages.push(page.placed);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlgorithmSettings;

    fn layout(w: u32, h: u32, rotation: bool) -> PageLayout {
        PageLayout::new(&AlgorithmSettings {
            allow_rotation: rotation,
            padding_x: 0,
            padding_y: 0,
            page_max_width: w,
            page_max_height: h,
            ..Default::default()
        })
    }

    #[test]
    fn split_leaves_maximal_free_rects() {
        let l = layout(10, 10, false);
        let mut page = MaxRectsPage::new(&l);
        page.place_rect(&Rect::new(0, 0, 4, 3));
        let mut free = page.free.clone();
        free.sort_by_key(|r| (r.x, r.y));
        assert_eq!(free, vec![Rect::new(0, 3, 10, 7), Rect::new(4, 0, 6, 10)]);
    }

    #[test]
    fn prefers_smallest_leftover_area() {
        let l = layout(100, 100, false);
        let mut page = MaxRectsPage::new(&l);
        page.place_rect(&Rect::new(0, 0, 60, 100));
        page.place_rect(&Rect::new(60, 0, 40, 50));
        // remaining free: (60,50,40,50); a 40x50 item is a perfect fit
        let (r, rot) = page.find_position((40, 50), None).expect("fits");
        assert_eq!(r, Rect::new(60, 50, 40, 50));
        assert!(!rot);
    }

    #[test]
    fn rotates_only_when_it_scores_better() {
        let l = layout(10, 4, true);
        let page = MaxRectsPage::new(&l);
        let (r, rot) = page.find_position((4, 10), Some((10, 4))).expect("fits rotated");
        assert!(rot);
        assert_eq!(r, Rect::new(0, 0, 10, 4));

        let (_, rot) = page.find_position((3, 3), Some((3, 3))).expect("fits");
        assert!(!rot, "equal scores prefer the unrotated orientation");
    }

    #[test]
    fn rotated_candidate_uses_its_own_footprint() {
        let l = layout(20, 10, true);
        let page = MaxRectsPage::new(&l);
        // 6x12 with a 4 px horizontal gutter: unrotated 10x12 misses, rotated 16x6 fits
        let (r, rot) = page.find_position((10, 12), Some((16, 6))).expect("fits rotated");
        assert!(rot);
        assert_eq!(r, Rect::new(0, 0, 16, 6));
    }

    #[test]
    fn opens_new_page_when_full() {
        let l = layout(10, 10, false);
        let rects: Vec<Rectangle> = (0..3).map(|i| Rectangle::new(format!("r{i}"), i, 10, 5)).collect();
        let pages = pack(rects, &l).expect("pack");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[1][0].original_index, 2);
        assert_eq!((pages[1][0].x, pages[1][0].y), (0, 0));
    }
}
