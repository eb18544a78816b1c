//! Core engine-facing contracts.
//!
//! Defines the seam between the screen state driven by scripts and the
//! backend that shows it (a real window or a headless recorder).

mod display;
mod headless;

pub use display::{Display, DisplayEvent};
pub use headless::{HeadlessDisplay, HeadlessProbe};
