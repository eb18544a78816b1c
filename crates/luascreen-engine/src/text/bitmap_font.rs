use std::fmt;
use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::canvas::{Canvas, Painter};
use crate::coords::Rect;
use crate::paint::Color;

/// Printable ASCII range rasterized from vector fonts.
const TTF_FIRST_CHAR: u8 = b' ';
const TTF_LAST_CHAR: u8 = b'~';
const TTF_SHEET_COLUMNS: u32 = 16;

/// Error returned when a font cannot be loaded.
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Layout of a glyph sheet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FontSpec {
    /// Cell width in sheet pixels.
    pub glyph_width: u32,
    /// Cell height in sheet pixels.
    pub glyph_height: u32,
    /// Character code stored in the top-left cell.
    pub first_char: u8,
    /// Extra advance added after every glyph (may be negative).
    pub spacing: i32,
    /// Advance by each glyph's inked width instead of the cell width.
    pub proportional: bool,
}

impl FontSpec {
    pub fn new(glyph_width: u32, glyph_height: u32) -> Self {
        Self {
            glyph_width,
            glyph_height,
            first_char: b' ',
            spacing: 0,
            proportional: false,
        }
    }
}

/// A loaded glyph sheet with per-glyph advances.
///
/// Glyph pixels are tinted by the painter colour and alpha-blended onto the
/// canvas; every sheet pixel covers one logical pixel.
#[derive(Debug, Clone)]
pub struct BitmapFont {
    sheet: RgbaImage,
    cell_w: u32,
    cell_h: u32,
    columns: u32,
    first_char: u8,
    spacing: i32,
    advances: Vec<i32>,
}

impl BitmapFont {
    /// Loads a glyph sheet from an image file (PNG or BMP).
    pub fn load(path: &Path, spec: FontSpec) -> Result<Self, FontLoadError> {
        let sheet = image::open(path)
            .map_err(|e| FontLoadError(format!("{}: {e}", path.display())))?
            .into_rgba8();
        log::debug!(
            "loaded glyph sheet {} ({}x{})",
            path.display(),
            sheet.width(),
            sheet.height()
        );
        Self::from_image(sheet, spec)
    }

    /// Builds a font from an in-memory glyph sheet.
    pub fn from_image(sheet: RgbaImage, spec: FontSpec) -> Result<Self, FontLoadError> {
        let FontSpec { glyph_width, glyph_height, first_char, spacing, proportional } = spec;

        if glyph_width == 0 || glyph_height == 0 {
            return Err(FontLoadError(format!(
                "glyph size must be positive, got {glyph_width}x{glyph_height}"
            )));
        }
        if sheet.width() < glyph_width || sheet.height() < glyph_height {
            return Err(FontLoadError(format!(
                "sheet {}x{} is smaller than one {glyph_width}x{glyph_height} glyph",
                sheet.width(),
                sheet.height()
            )));
        }

        let columns = sheet.width() / glyph_width;
        let rows = sheet.height() / glyph_height;
        let capacity = 256 - first_char as usize;
        let glyph_count = ((columns * rows) as usize).min(capacity);

        let mut font = Self {
            sheet,
            cell_w: glyph_width,
            cell_h: glyph_height,
            columns,
            first_char,
            spacing,
            advances: vec![glyph_width as i32; glyph_count],
        };

        if proportional {
            for index in 0..glyph_count {
                font.advances[index] = font.inked_width(index).unwrap_or(glyph_width.div_ceil(2)) as i32;
            }
        }

        Ok(font)
    }

    /// Rasterizes the printable ASCII range of a TrueType/OpenType font at
    /// `px` pixels per em into a glyph sheet with proportional advances.
    pub fn from_ttf(bytes: &[u8], px: f32, spacing: i32) -> Result<Self, FontLoadError> {
        if !(px.is_finite() && px > 0.0) {
            return Err(FontLoadError(format!("font size must be positive, got {px}")));
        }

        let font = fontdue::Font::from_bytes(
            bytes,
            fontdue::FontSettings { scale: px, ..fontdue::FontSettings::default() },
        )
        .map_err(|e| FontLoadError(e.to_string()))?;

        let (ascent, descent) = font
            .horizontal_line_metrics(px)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((px, 0.0));
        let baseline = ascent.round() as i32;
        let cell_h = ((ascent - descent).ceil() as u32).max(1);

        let glyphs: Vec<_> = (TTF_FIRST_CHAR..=TTF_LAST_CHAR)
            .map(|code| font.rasterize(code as char, px))
            .collect();

        let cell_w = glyphs
            .iter()
            .map(|(m, _)| (m.advance_width.ceil() as i32).max(m.xmin.max(0) + m.width as i32))
            .max()
            .unwrap_or(1)
            .max(1) as u32;

        let rows = (glyphs.len() as u32).div_ceil(TTF_SHEET_COLUMNS);
        let mut sheet = RgbaImage::new(cell_w * TTF_SHEET_COLUMNS, cell_h * rows);
        let mut advances = Vec::with_capacity(glyphs.len());

        for (index, (metrics, coverage)) in glyphs.iter().enumerate() {
            let cell_x = (index as u32 % TTF_SHEET_COLUMNS) * cell_w;
            let cell_y = (index as u32 / TTF_SHEET_COLUMNS) * cell_h;
            let left = metrics.xmin.max(0);
            let top = baseline - (metrics.height as i32 + metrics.ymin);

            for by in 0..metrics.height {
                for bx in 0..metrics.width {
                    let value = coverage[by * metrics.width + bx];
                    let x = left + bx as i32;
                    let y = top + by as i32;
                    if value == 0 || x < 0 || y < 0 || x as u32 >= cell_w || y as u32 >= cell_h {
                        continue;
                    }
                    sheet.put_pixel(cell_x + x as u32, cell_y + y as u32, Rgba([255, 255, 255, value]));
                }
            }

            advances.push((metrics.advance_width.round() as i32).max(1));
        }

        log::debug!("rasterized {} glyphs at {px}px into a {cell_w}x{cell_h} grid", glyphs.len());

        Ok(Self {
            sheet,
            cell_w,
            cell_h,
            columns: TTF_SHEET_COLUMNS,
            first_char: TTF_FIRST_CHAR,
            spacing,
            advances,
        })
    }

    #[inline]
    pub fn cell_width(&self) -> u32 {
        self.cell_w
    }

    #[inline]
    pub fn line_height(&self) -> u32 {
        self.cell_h
    }

    pub fn glyph_count(&self) -> usize {
        self.advances.len()
    }

    fn glyph_index(&self, code: u8) -> Option<usize> {
        let index = code.checked_sub(self.first_char)? as usize;
        (index < self.advances.len()).then_some(index)
    }

    fn cell_origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        ((index % self.columns) * self.cell_w, (index / self.columns) * self.cell_h)
    }

    /// Width of the inked part of a glyph (rightmost opaque column + 1).
    fn inked_width(&self, index: usize) -> Option<u32> {
        let (cx, cy) = self.cell_origin(index);
        (0..self.cell_w).rev().find(|&gx| {
            (0..self.cell_h).any(|gy| self.sheet.get_pixel(cx + gx, cy + gy)[3] != 0)
        }).map(|gx| gx + 1)
    }

    /// Horizontal advance of `code` in logical pixels, spacing included.
    ///
    /// Codes outside the sheet advance by the cell width.
    pub fn advance(&self, code: u8) -> i32 {
        let base = self
            .glyph_index(code)
            .map_or(self.cell_w as i32, |index| self.advances[index]);
        base + self.spacing
    }

    pub fn text_width(&self, text: &[u8]) -> i32 {
        text.iter().map(|&code| self.advance(code)).sum()
    }

    /// Draws one glyph with its top-left corner at logical `(x, y)`.
    ///
    /// Returns the advance.
    pub fn draw_char(&self, canvas: &mut Canvas, painter: &Painter, x: i32, y: i32, code: u8) -> i32 {
        let Some(index) = self.glyph_index(code) else {
            return self.advance(code);
        };

        let (cx, cy) = self.cell_origin(index);
        let tint = painter.color();

        for gy in 0..self.cell_h {
            for gx in 0..self.cell_w {
                let Rgba([r, g, b, a]) = *self.sheet.get_pixel(cx + gx, cy + gy);
                let color = Color::rgba(r, g, b, a).modulate(tint);
                if color.a == 0 {
                    continue;
                }
                let cell = Rect::new(x.saturating_add(gx as i32), y.saturating_add(gy as i32), 1, 1);
                canvas.blend_rect(painter.to_physical(cell), color);
            }
        }

        self.advance(code)
    }

    /// Draws `text` byte by byte starting at logical `(x, y)`.
    ///
    /// Returns the x position after the last glyph.
    pub fn draw_text(&self, canvas: &mut Canvas, painter: &Painter, text: &[u8], x: i32, y: i32) -> i32 {
        text.iter().fold(x, |pen, &code| {
            pen.saturating_add(self.draw_char(canvas, painter, pen, y, code))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

    /// 4x4 cells, 2 columns x 2 rows: 'A' full block, 'B' 2px wide bar,
    /// 'C' empty, 'D' single top-left dot.
    fn sheet() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            let (col, row) = (x / 4, y / 4);
            let (gx, gy) = (x % 4, y % 4);
            let inked = match (col, row) {
                (0, 0) => true,
                (1, 0) => gx < 2,
                (0, 1) => false,
                _ => gx == 0 && gy == 0,
            };
            if inked { INK } else { Rgba([0, 0, 0, 0]) }
        })
    }

    fn spec() -> FontSpec {
        FontSpec { first_char: b'A', ..FontSpec::new(4, 4) }
    }

    fn count_non_transparent(canvas: &Canvas) -> usize {
        canvas.pixels().iter().filter(|p| p.a != 0).count()
    }

    #[test]
    fn rejects_zero_glyph_size() {
        assert!(BitmapFont::from_image(sheet(), FontSpec::new(0, 4)).is_err());
    }

    #[test]
    fn rejects_sheet_smaller_than_glyph() {
        assert!(BitmapFont::from_image(sheet(), FontSpec::new(16, 4)).is_err());
    }

    #[test]
    fn glyph_count_from_grid() {
        let font = BitmapFont::from_image(sheet(), spec()).unwrap();
        assert_eq!(font.glyph_count(), 4);
    }

    #[test]
    fn glyph_count_capped_by_first_char() {
        let spec = FontSpec { first_char: 254, ..FontSpec::new(4, 4) };
        let font = BitmapFont::from_image(sheet(), spec).unwrap();
        assert_eq!(font.glyph_count(), 2);
    }

    #[test]
    fn monospace_advance_is_cell_width_plus_spacing() {
        let font = BitmapFont::from_image(sheet(), FontSpec { spacing: 1, ..spec() }).unwrap();
        assert_eq!(font.advance(b'B'), 5);
        assert_eq!(font.text_width(b"AB"), 10);
    }

    #[test]
    fn proportional_advance_uses_inked_width() {
        let font = BitmapFont::from_image(sheet(), FontSpec { proportional: true, ..spec() }).unwrap();
        assert_eq!(font.advance(b'A'), 4);
        assert_eq!(font.advance(b'B'), 2);
        assert_eq!(font.advance(b'C'), 2);
        assert_eq!(font.advance(b'D'), 1);
    }

    #[test]
    fn missing_glyph_draws_nothing_but_advances() {
        let font = BitmapFont::from_image(sheet(), spec()).unwrap();
        let mut canvas = Canvas::new(16, 16);
        let advance = font.draw_char(&mut canvas, &Painter::new(1), 0, 0, b'z');
        assert_eq!(advance, 4);
        assert_eq!(count_non_transparent(&canvas), 0);
    }

    #[test]
    fn draw_char_is_scaled_and_tinted() {
        let font = BitmapFont::from_image(sheet(), spec()).unwrap();
        let mut canvas = Canvas::new(16, 16);
        let mut painter = Painter::new(2);
        painter.set_color(Color::rgba(255, 0, 0, 255));
        font.draw_char(&mut canvas, &painter, 1, 1, b'D');
        assert_eq!(count_non_transparent(&canvas), 4);
        assert_eq!(canvas.pixel(2, 2), Some(Color::rgba(255, 0, 0, 255)));
        assert_eq!(canvas.pixel(3, 3), Some(Color::rgba(255, 0, 0, 255)));
    }

    #[test]
    fn draw_char_blends_over_existing_pixels() {
        let font = BitmapFont::from_image(sheet(), spec()).unwrap();
        let mut canvas = Canvas::new(8, 8);
        canvas.clear(Color::BLACK);
        font.draw_char(&mut canvas, &Painter::new(1), 0, 0, b'C');
        assert!(canvas.pixels().iter().all(|p| *p == Color::BLACK));
    }

    #[test]
    fn draw_text_returns_pen_position() {
        let font = BitmapFont::from_image(sheet(), spec()).unwrap();
        let mut canvas = Canvas::new(32, 8);
        let end = font.draw_text(&mut canvas, &Painter::new(1), b"ABD", 3, 0);
        assert_eq!(end, 3 + 12);
        assert_eq!(canvas.pixel(3, 0), Some(Color::WHITE));
        assert_eq!(canvas.pixel(11, 0), Some(Color::WHITE));
        assert_eq!(canvas.pixel(12, 0), Some(Color::TRANSPARENT));
    }

    /// Builds a minimal TrueType font: 1000 units per em, ascender 800,
    /// descender -200. 'A' is a solid 400x800 box; every other character falls
    /// back to an empty notdef glyph. Both advance by 500 units.
    fn box_font() -> Vec<u8> {
        fn words(values: &[i32]) -> Vec<u8> {
            values.iter().flat_map(|v| (*v as u16).to_be_bytes()).collect()
        }

        let mut glyf = words(&[1, 0, 0, 400, 800, 3, 0]);
        glyf.extend_from_slice(&[1, 1, 1, 1]); // on-curve, 16-bit deltas
        glyf.extend(words(&[0, 0, 400, 0, 0, 800, 0, -800]));

        // Sorted by tag, as the table directory requires.
        let tables: [(&[u8; 4], Vec<u8>); 7] = [
            (b"cmap", words(&[0, 1, 3, 1, 0, 12, 6, 12, 0, b'A' as i32, 1, 1])),
            (b"glyf", glyf),
            (
                b"head",
                words(&[
                    1, 0, 1, 0, 0, 0, 0x5F0F, 0x3CF5, 0, 1000, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 400, 800,
                    0, 8, 2, 0, 0,
                ]),
            ),
            (b"hhea", words(&[1, 0, 800, -200, 0, 500, 0, 0, 400, 1, 0, 0, 0, 0, 0, 0, 0, 2])),
            (b"hmtx", words(&[500, 0, 500, 0])),
            (b"loca", words(&[0, 0, 17])),
            (b"maxp", words(&[0, 0x5000, 2])),
        ];

        let mut font = words(&[1, 0, tables.len() as i32, 64, 2, 48]);
        let mut offset = font.len() + tables.len() * 16;
        let mut body = Vec::new();
        for (tag, data) in &tables {
            font.extend_from_slice(*tag);
            font.extend_from_slice(&[0; 4]); // checksum
            font.extend_from_slice(&(offset as u32).to_be_bytes());
            font.extend_from_slice(&(data.len() as u32).to_be_bytes());

            let padded = data.len().next_multiple_of(4);
            body.extend_from_slice(data);
            body.resize(body.len() + padded - data.len(), 0);
            offset += padded;
        }
        font.extend(body);
        font
    }

    #[test]
    fn ttf_glyphs_are_rasterized_into_a_grid() {
        let font = BitmapFont::from_ttf(&box_font(), 10.0, 1).unwrap();
        assert_eq!(font.glyph_count(), (TTF_LAST_CHAR - TTF_FIRST_CHAR + 1) as usize);
        assert_eq!(font.line_height(), 10);
        assert_eq!(font.cell_width(), 5);

        // 500 units at 10 px per 1000 units, plus one pixel of spacing.
        assert_eq!(font.advance(b'A'), 6);
        assert_eq!(font.text_width(b"A?"), 12);
    }

    #[test]
    fn ttf_glyph_sits_on_the_baseline() {
        let font = BitmapFont::from_ttf(&box_font(), 10.0, 0).unwrap();
        let mut canvas = Canvas::new(16, 16);
        let advance = font.draw_char(&mut canvas, &Painter::new(1), 0, 0, b'A');
        assert_eq!(advance, 5);

        // The box spans 4x8 pixels above the baseline at y = 8.
        for (x, y) in [(0, 0), (3, 0), (1, 4), (3, 7)] {
            assert!(canvas.pixel(x, y).is_some_and(|p| p.a > 0), "({x}, {y}) is inked");
        }
        for (x, y) in [(4, 0), (0, 8), (5, 3)] {
            assert_eq!(canvas.pixel(x, y), Some(Color::TRANSPARENT));
        }

        let mut blank = Canvas::new(16, 16);
        font.draw_char(&mut blank, &Painter::new(1), 0, 0, b'B');
        assert_eq!(count_non_transparent(&blank), 0);
    }

    #[test]
    fn invalid_ttf_bytes_fail() {
        assert!(BitmapFont::from_ttf(b"definitely not a font", 12.0, 0).is_err());
    }

    #[test]
    fn ttf_rejects_non_positive_size() {
        assert!(BitmapFont::from_ttf(&[], 0.0, 0).is_err());
    }
}
