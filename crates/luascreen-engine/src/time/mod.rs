//! Frame timing.
//!
//! One `FrameClock` per screen; `tick()` once per presented frame.

mod frame_clock;

pub use frame_clock::FrameClock;
