/// Axis-aligned rectangle in whole pixels (top-left origin).
///
/// Used both for logical (pre-scale) and physical (render target) coordinates;
/// callers convert with [`Rect::scaled`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(w: i32, h: i32) -> Self {
        Self::new(0, 0, w, h)
    }

    #[inline]
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.w)
    }

    #[inline]
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// A rectangle with non-positive width or height covers no pixels.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    /// Multiplies position and size by an integer scale factor.
    ///
    /// Both edges are scaled in `i64` and clamped to `±EDGE_LIMIT`, which keeps
    /// `right()`/`bottom()` exact. Whatever part of the scaled area lies in
    /// range is still covered.
    #[inline]
    pub fn scaled(self, scale: i32) -> Rect {
        let s = i64::from(scale);
        let edge = |v: i64| v.clamp(-EDGE_LIMIT, EDGE_LIMIT);
        let span = |pos: i32, len: i32| {
            let start = edge(i64::from(pos) * s);
            let end = edge((i64::from(pos) + i64::from(len)) * s);
            (start as i32, (end - start) as i32)
        };

        let (x, w) = span(self.x, self.w);
        let (y, h) = span(self.y, self.h);
        Rect::new(x, y, w, h)
    }
}

/// Largest scaled edge magnitude; two of them still fit in an `i32` length.
const EDGE_LIMIT: i64 = (i32::MAX / 2) as i64;

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: i32, y: i32, w: i32, h: i32) -> Rect { Rect::new(x, y, w, h) }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let a = r(0, 0, 10, 10);
        let b = r(5, 5, 10, 10);
        assert_eq!(a.intersect(b), Some(r(5, 5, 5, 5)));
    }

    #[test]
    fn intersect_contained() {
        let outer = r(0, 0, 100, 100);
        let inner = r(10, 10, 20, 20);
        assert_eq!(outer.intersect(inner), Some(inner));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        let a = r(0, 0, 10, 10);
        let b = r(10, 0, 10, 10);
        assert!(a.intersect(b).is_none());
    }

    #[test]
    fn intersect_negative_size_returns_none() {
        assert!(r(0, 0, 10, 10).intersect(r(5, 5, -3, 4)).is_none());
    }

    // ── scaled ────────────────────────────────────────────────────────────

    #[test]
    fn scaled_multiplies_all_fields() {
        assert_eq!(r(1, 2, 3, 4).scaled(3), r(3, 6, 9, 12));
    }

    #[test]
    fn scaled_clamps_out_of_range_positions() {
        let s = r(i32::MAX / 2, 0, 1, 1).scaled(4);
        assert_eq!(s.x, i32::MAX / 2);
        assert!(s.is_empty());
        assert!(s.intersect(Rect::from_size(20, 10)).is_none());
    }

    #[test]
    fn scaled_keeps_the_visible_part_of_a_huge_rect() {
        // Logical x -1073741824..6 at scale 2 covers physical x 0..12 on screen.
        let s = r(-1073741824, 0, 1073741830, 1).scaled(2);
        assert_eq!(s.intersect(Rect::from_size(20, 10)), Some(r(0, 0, 12, 2)));
    }

    #[test]
    fn scaled_keeps_empty_rects_empty() {
        assert!(r(3, 3, 0, 2).scaled(4).is_empty());
        assert!(r(3, 3, -5, 2).scaled(4).is_empty());
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_or_negative_size() {
        assert!(r(0, 0, 0, 5).is_empty());
        assert!(r(0, 0, 5, -1).is_empty());
        assert!(!r(0, 0, 1, 1).is_empty());
    }
}
