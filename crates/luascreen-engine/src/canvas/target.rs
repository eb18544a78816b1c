use crate::coords::Rect;
use crate::paint::Color;

/// RGBA8 pixel buffer, row-major, top-left origin.
///
/// All writes are clipped to the buffer bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a canvas filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrites a single pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Composites `color` over a single pixel. Out-of-bounds writes are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.over(self.pixels[i]);
        }
    }

    /// Overwrites every pixel of `rect` (clipped) with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(r) = rect.intersect(self.bounds()) else { return };
        let stride = self.width as usize;
        for y in r.y..r.bottom() {
            let row = y as usize * stride;
            self.pixels[row + r.x as usize..row + r.right() as usize].fill(color);
        }
    }

    /// Composites `color` over every pixel of `rect` (clipped).
    pub fn blend_rect(&mut self, rect: Rect, color: Color) {
        if color.a == 255 {
            return self.fill_rect(rect, color);
        }
        let Some(r) = rect.intersect(self.bounds()) else { return };
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Overwrites the whole canvas.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Returns a new canvas of `width` x `height` whose top-left region holds
    /// the overlapping pixels of `self`; the remainder is transparent.
    pub fn resized(&self, width: u32, height: u32) -> Canvas {
        let mut out = Canvas::new(width, height);
        let copy_w = self.width.min(width) as usize;
        let copy_h = self.height.min(height) as usize;

        for y in 0..copy_h {
            let src = y * self.width as usize;
            let dst = y * width as usize;
            out.pixels[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
        }

        out
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major, `4 * width` bytes per row.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
