use anyhow::Result;

use crate::canvas::Canvas;
use crate::input::InputEvent;

/// Window-level notifications produced while pumping the display.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// The drawable area changed size (physical pixels).
    Resized { width: u32, height: u32 },
    /// The user asked to close the window.
    CloseRequested,
    Input(InputEvent),
}

/// Backend a screen presents to.
///
/// The screen owns exactly one display for its lifetime. All methods are
/// called from the thread that created it.
pub trait Display {
    /// Copies `canvas` 1:1 to the top-left of the output and shows it.
    ///
    /// May block on vertical sync. Does nothing once the display is closed.
    fn present(&mut self, canvas: &Canvas) -> Result<()>;

    /// Processes pending platform events and drains the resulting queue.
    fn poll_events(&mut self) -> Vec<DisplayEvent>;

    /// Whether the output is still open.
    fn is_open(&self) -> bool;

    /// Closes the output; later presents are ignored.
    fn close(&mut self);

    fn set_title(&mut self, title: &str);
}
