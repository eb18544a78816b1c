use std::cell::RefCell;
use std::rc::Rc;

use luascreen_engine::canvas::{Canvas, Painter};
use luascreen_engine::config::ScreenConfig;
use luascreen_engine::core::{Display, DisplayEvent};
use luascreen_engine::input::InputState;
use luascreen_engine::text::BitmapFont;
use luascreen_engine::time::FrameClock;
use mlua::Lua;

use crate::event::ScriptEvent;

/// Opens the display backing a screen. Called once, on the first
/// `require "screen"`.
pub type DisplayOpener = Box<dyn FnOnce(&ScreenConfig) -> anyhow::Result<Box<dyn Display>>>;

pub(crate) type SharedScreen = Rc<RefCell<ScreenState>>;

/// What `install` leaves behind until the screen is opened.
pub(crate) struct Setup {
    pub config: ScreenConfig,
    pub open: DisplayOpener,
}

/// Everything a Lua state knows about its screen.
pub(crate) struct ScreenState {
    display: Box<dyn Display>,
    pub canvas: Canvas,
    pub painter: Painter,
    pub font: Option<BitmapFont>,
    pub input: InputState,
    clock: FrameClock,
    delta: f32,
    quit_requested: bool,
}

impl ScreenState {
    pub fn new(display: Box<dyn Display>, config: &ScreenConfig) -> Self {
        let scale = i32::try_from(config.render.scale).unwrap_or(i32::MAX);
        Self {
            display,
            canvas: Canvas::new(config.window.width, config.window.height),
            painter: Painter::new(scale),
            font: None,
            input: InputState::default(),
            clock: FrameClock::new(),
            delta: 0.0,
            quit_requested: false,
        }
    }

    /// Seconds between the last two presents.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn set_title(&mut self, title: &str) {
        self.display.set_title(title);
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Shows the canvas and collects the events that arrived since the last
    /// present, already in script terms.
    ///
    /// A closed display presents nothing and reports no events.
    pub fn present(&mut self) -> anyhow::Result<Vec<ScriptEvent>> {
        if !self.display.is_open() {
            return Ok(Vec::new());
        }

        self.display.present(&self.canvas)?;
        self.delta = self.clock.tick();

        let scale = self.painter.scale();
        let mut events = Vec::new();
        for ev in self.display.poll_events() {
            if let DisplayEvent::Input(input) = &ev {
                self.input.apply_event(input);
            }
            if let Some(script_event) = ScriptEvent::from_display(&ev, scale) {
                events.push(script_event);
            }
        }
        Ok(events)
    }

    /// Applies a pending quit request; returns whether the display is still open.
    pub fn finish_frame(&mut self) -> bool {
        if self.quit_requested {
            self.quit_requested = false;
            if self.display.is_open() {
                log::info!("closing screen");
                self.display.close();
            }
        }
        self.display.is_open()
    }
}

/// The open screen of `lua`.
pub(crate) fn shared(lua: &Lua) -> mlua::Result<SharedScreen> {
    lua.app_data_ref::<SharedScreen>()
        .map(|screen| Rc::clone(&*screen))
        .ok_or_else(|| mlua::Error::runtime("screen is not open; require \"screen\" first"))
}

/// Same as [`shared`], but `None` instead of an error when no screen is open.
pub(crate) fn try_shared(lua: &Lua) -> Option<SharedScreen> {
    lua.app_data_ref::<SharedScreen>().map(|screen| Rc::clone(&*screen))
}

/// Opens the screen on first use.
pub(crate) fn open(lua: &Lua) -> mlua::Result<SharedScreen> {
    if let Some(screen) = try_shared(lua) {
        return Ok(screen);
    }

    let Setup { config, open } = lua
        .remove_app_data::<Setup>()
        .ok_or_else(|| mlua::Error::runtime("screen initialization already failed"))?;

    let display = open(&config).map_err(|e| {
        log::error!("failed to open screen: {e:#}");
        mlua::Error::runtime(format!("{e:#}"))
    })?;

    let screen: SharedScreen = Rc::new(RefCell::new(ScreenState::new(display, &config)));
    lua.set_app_data(Rc::clone(&screen));
    log::debug!(
        "screen opened ({}x{}, scale {})",
        config.window.width,
        config.window.height,
        config.render.scale
    );
    Ok(screen)
}
