//! wgpu device and window surface.
//!
//! `Gpu` owns the surface configuration and hands out one `GpuFrame` per
//! present; surface errors are mapped to a `SurfaceErrorAction`.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::{canvas_texture_format, SurfaceErrorAction};
