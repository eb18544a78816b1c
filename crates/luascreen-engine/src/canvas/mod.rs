//! Software render target.
//!
//! `Canvas` is the off-screen pixel buffer every draw call lands in. It is
//! uploaded and copied to the window by the display on present.
//! `Painter` holds the drawing state (colour + integer scale) and maps logical
//! coordinates onto canvas pixels.

mod painter;
mod target;

pub use painter::{Painter, ScaleError};
pub use target::Canvas;
