//! Axis-aligned bounding boxes and overlap tests

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap: rectangles that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        aabb_overlap(self, other)
    }
}

/// Separating-axis test for two axis-aligned rectangles
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_rects() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &b));
    }

    #[test]
    fn test_disjoint_rects() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let c = Rect::from_xywh(20.0, 20.0, 10.0, 10.0);
        assert!(!aabb_overlap(&a, &c));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let right = Rect::from_xywh(10.0, 0.0, 10.0, 10.0);
        let below = Rect::from_xywh(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::from_xywh(40.0, 40.0, 5.0, 5.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 1.0f32..100.0, ah in 1.0f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 1.0f32..100.0, bh in 1.0f32..100.0,
        ) {
            let a = Rect::from_xywh(ax, ay, aw, ah);
            let b = Rect::from_xywh(bx, by, bw, bh);
            prop_assert_eq!(aabb_overlap(&a, &b), aabb_overlap(&b, &a));
        }

        #[test]
        fn rect_overlaps_itself(x in -500.0f32..500.0, y in -500.0f32..500.0, w in 1.0f32..100.0, h in 1.0f32..100.0) {
            let r = Rect::from_xywh(x, y, w, h);
            prop_assert!(r.overlaps(&r));
        }
    }
}
