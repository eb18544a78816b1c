//! GPU presentation of the software canvas.
//!
//! The canvas is uploaded to a texture every frame and drawn onto the
//! surface's top-left corner without scaling; the rest of the surface is
//! cleared to black.

mod blit;
mod ctx;

pub use blit::{CanvasBlitter, copy_region};
pub use ctx::{RenderCtx, RenderTarget};
