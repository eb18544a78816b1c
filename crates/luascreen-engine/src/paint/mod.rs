//! Colour model shared by the canvas and fonts.
//!
//! Scope:
//! - straight-alpha RGBA8 colour
//! - colour modulation and source-over compositing

pub mod color;

pub use color::Color;
