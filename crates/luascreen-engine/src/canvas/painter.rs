use std::fmt;

use crate::coords::Rect;
use crate::paint::Color;

use super::Canvas;

/// Error returned by [`Painter::set_scale`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScaleError(pub i64);

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render scale must be a positive integer, got {}", self.0)
    }
}

impl std::error::Error for ScaleError {}

/// Drawing state applied to a [`Canvas`].
///
/// Coordinates passed to the drawing methods are logical: one logical pixel
/// covers a `scale` x `scale` block of canvas pixels. Primitives overwrite the
/// destination (no blending), including its alpha.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Painter {
    color: Color,
    scale: i32,
}

impl Default for Painter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Painter {
    /// Creates a painter drawing in opaque white.
    ///
    /// A non-positive `scale` is treated as 1.
    pub fn new(scale: i32) -> Self {
        Self {
            color: Color::WHITE,
            scale: scale.max(1),
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: i64) -> Result<(), ScaleError> {
        match i32::try_from(scale) {
            Ok(s) if s >= 1 => {
                self.scale = s;
                Ok(())
            }
            _ => Err(ScaleError(scale)),
        }
    }

    /// Maps a logical rectangle to canvas pixels.
    #[inline]
    pub fn to_physical(&self, logical: Rect) -> Rect {
        logical.scaled(self.scale)
    }

    /// Logical extent of `canvas` (its size divided by the scale, rounded down).
    pub fn logical_size(&self, canvas: &Canvas) -> (u32, u32) {
        let s = self.scale as u32;
        (canvas.width() / s, canvas.height() / s)
    }

    pub fn point(&self, canvas: &mut Canvas, x: i32, y: i32) {
        canvas.fill_rect(self.to_physical(Rect::new(x, y, 1, 1)), self.color);
    }

    pub fn fill_rect(&self, canvas: &mut Canvas, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        canvas.fill_rect(self.to_physical(rect), self.color);
    }

    /// Draws the one-logical-pixel border of `rect`.
    pub fn rect_outline(&self, canvas: &mut Canvas, rect: Rect) {
        if rect.is_empty() {
            return;
        }

        let Rect { x, y, w, h } = rect;
        let edges = [
            Rect::new(x, y, w, 1),
            Rect::new(x, rect.bottom() - 1, w, 1),
            Rect::new(x, y, 1, h),
            Rect::new(rect.right() - 1, y, 1, h),
        ];

        for edge in edges {
            canvas.fill_rect(self.to_physical(edge), self.color);
        }
    }

    /// Fills the whole canvas with the current colour, regardless of scale.
    pub fn clear(&self, canvas: &mut Canvas) {
        canvas.clear(self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(canvas: &Canvas, color: Color) -> usize {
        canvas.pixels().iter().filter(|p| **p == color).count()
    }

    #[test]
    fn default_color_is_white() {
        assert_eq!(Painter::new(2).color(), Color::WHITE);
    }

    #[test]
    fn point_covers_scale_block() {
        let mut canvas = Canvas::new(8, 8);
        let p = Painter::new(2);
        p.point(&mut canvas, 1, 2);
        assert_eq!(count(&canvas, Color::WHITE), 4);
        assert_eq!(canvas.pixel(2, 4), Some(Color::WHITE));
        assert_eq!(canvas.pixel(3, 5), Some(Color::WHITE));
        assert_eq!(canvas.pixel(4, 4), Some(Color::TRANSPARENT));
    }

    #[test]
    fn point_outside_is_ignored() {
        let mut canvas = Canvas::new(4, 4);
        Painter::new(1).point(&mut canvas, -1, 10);
        assert_eq!(count(&canvas, Color::WHITE), 0);
    }

    #[test]
    fn fill_rect_scaled() {
        let mut canvas = Canvas::new(10, 10);
        Painter::new(2).fill_rect(&mut canvas, Rect::new(0, 0, 2, 3));
        assert_eq!(count(&canvas, Color::WHITE), 4 * 6);
    }

    #[test]
    fn outline_leaves_interior() {
        let mut canvas = Canvas::new(5, 5);
        Painter::new(1).rect_outline(&mut canvas, Rect::new(0, 0, 5, 5));
        assert_eq!(count(&canvas, Color::WHITE), 16);
        assert_eq!(canvas.pixel(2, 2), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(4, 4), Some(Color::WHITE));
    }

    #[test]
    fn outline_thickness_follows_scale() {
        let mut canvas = Canvas::new(12, 12);
        Painter::new(2).rect_outline(&mut canvas, Rect::new(0, 0, 6, 6));
        assert_eq!(canvas.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(canvas.pixel(2, 2), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(10, 10), Some(Color::WHITE));
    }

    #[test]
    fn empty_rect_draws_nothing() {
        let mut canvas = Canvas::new(4, 4);
        let p = Painter::new(1);
        p.rect_outline(&mut canvas, Rect::new(1, 1, 0, 3));
        p.fill_rect(&mut canvas, Rect::new(1, 1, 3, -2));
        assert_eq!(count(&canvas, Color::WHITE), 0);
    }

    #[test]
    fn clear_ignores_scale() {
        let mut canvas = Canvas::new(5, 3);
        let mut p = Painter::new(4);
        p.set_color(Color::BLACK);
        p.clear(&mut canvas);
        assert_eq!(count(&canvas, Color::BLACK), 15);
    }

    #[test]
    fn set_scale_rejects_non_positive() {
        let mut p = Painter::new(2);
        assert_eq!(p.set_scale(0), Err(ScaleError(0)));
        assert_eq!(p.set_scale(-3), Err(ScaleError(-3)));
        assert_eq!(p.scale(), 2);
        assert!(p.set_scale(3).is_ok());
        assert_eq!(p.scale(), 3);
    }

    #[test]
    fn logical_size_rounds_down() {
        let canvas = Canvas::new(601, 400);
        assert_eq!(Painter::new(2).logical_size(&canvas), (300, 200));
    }
}
