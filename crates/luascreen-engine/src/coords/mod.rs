//! Pixel geometry shared by the canvas, fonts and the presenter.
//!
//! Canonical CPU space:
//! - whole pixels
//! - origin top-left
//! - +X right, +Y down

mod rect;

pub use rect::Rect;
