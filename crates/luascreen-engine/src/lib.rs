//! luascreen engine crate.
//!
//! Software canvas, drawing state and bitmap fonts, plus the window/GPU
//! runtime that presents the canvas. Scripting bindings live in
//! `luascreen-lua`.

pub mod canvas;
pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;
pub mod time;
pub mod window;
