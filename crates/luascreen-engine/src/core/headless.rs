use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;

use crate::canvas::Canvas;

use super::{Display, DisplayEvent};

#[derive(Debug)]
struct Recorder {
    open: bool,
    frames: u64,
    frame_limit: Option<u64>,
    last_frame: Option<Canvas>,
    pending: VecDeque<DisplayEvent>,
    title: String,
}

/// Display without a window.
///
/// Presented frames are recorded instead of shown. Used for tests and for
/// running scripts in CI; a [`HeadlessProbe`] injects events and inspects
/// what was presented.
#[derive(Debug)]
pub struct HeadlessDisplay {
    recorder: Rc<RefCell<Recorder>>,
}

impl HeadlessDisplay {
    pub fn new(title: &str) -> Self {
        Self {
            recorder: Rc::new(RefCell::new(Recorder {
                open: true,
                frames: 0,
                frame_limit: None,
                last_frame: None,
                pending: VecDeque::new(),
                title: title.to_string(),
            })),
        }
    }

    /// Requests a close after `frames` presents, as if the user closed the window.
    pub fn with_frame_limit(self, frames: u64) -> Self {
        self.recorder.borrow_mut().frame_limit = Some(frames);
        self
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe { recorder: Rc::clone(&self.recorder) }
    }
}

impl Display for HeadlessDisplay {
    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        let mut rec = self.recorder.borrow_mut();
        if !rec.open {
            return Ok(());
        }

        rec.frames += 1;
        rec.last_frame = Some(canvas.clone());

        if rec.frame_limit == Some(rec.frames) {
            log::debug!("headless frame limit of {} reached", rec.frames);
            rec.pending.push_back(DisplayEvent::CloseRequested);
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<DisplayEvent> {
        self.recorder.borrow_mut().pending.drain(..).collect()
    }

    fn is_open(&self) -> bool {
        self.recorder.borrow().open
    }

    fn close(&mut self) {
        self.recorder.borrow_mut().open = false;
    }

    fn set_title(&mut self, title: &str) {
        self.recorder.borrow_mut().title = title.to_string();
    }
}

/// Test-side handle onto a [`HeadlessDisplay`].
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    recorder: Rc<RefCell<Recorder>>,
}

impl HeadlessProbe {
    /// Queues an event for the next `poll_events`.
    pub fn push_event(&self, event: DisplayEvent) {
        self.recorder.borrow_mut().pending.push_back(event);
    }

    pub fn frames_presented(&self) -> u64 {
        self.recorder.borrow().frames
    }

    pub fn last_frame(&self) -> Option<Canvas> {
        self.recorder.borrow().last_frame.clone()
    }

    pub fn is_open(&self) -> bool {
        self.recorder.borrow().open
    }

    pub fn title(&self) -> String {
        self.recorder.borrow().title.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Color;

    #[test]
    fn records_presented_frames() {
        let mut display = HeadlessDisplay::new("t");
        let probe = display.probe();
        let mut canvas = Canvas::new(2, 2);
        canvas.clear(Color::WHITE);
        display.present(&canvas).unwrap();
        assert_eq!(probe.frames_presented(), 1);
        assert_eq!(probe.last_frame(), Some(canvas));
    }

    #[test]
    fn frame_limit_requests_close() {
        let mut display = HeadlessDisplay::new("t").with_frame_limit(2);
        let canvas = Canvas::new(1, 1);
        display.present(&canvas).unwrap();
        assert!(display.poll_events().is_empty());
        display.present(&canvas).unwrap();
        assert_eq!(display.poll_events(), vec![DisplayEvent::CloseRequested]);
    }

    #[test]
    fn closed_display_ignores_presents() {
        let mut display = HeadlessDisplay::new("t");
        let probe = display.probe();
        display.close();
        display.present(&Canvas::new(1, 1)).unwrap();
        assert_eq!(probe.frames_presented(), 0);
        assert!(!probe.is_open());
    }

    #[test]
    fn injected_events_are_drained_once() {
        let mut display = HeadlessDisplay::new("t");
        display.probe().push_event(DisplayEvent::Resized { width: 3, height: 4 });
        assert_eq!(display.poll_events().len(), 1);
        assert!(display.poll_events().is_empty());
    }
}
