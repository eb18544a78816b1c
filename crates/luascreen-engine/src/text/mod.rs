//! Bitmap text.
//!
//! Fonts are glyph sheets: a grid of equally sized cells, one per character
//! code starting at `first_char`. Sheets come from an image file or are
//! rasterized from a TrueType/OpenType font.

mod bitmap_font;

pub use bitmap_font::{BitmapFont, FontLoadError, FontSpec};
