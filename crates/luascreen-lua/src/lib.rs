//! Lua bindings for luascreen.
//!
//! [`install`] registers two modules in `package.preload`:
//!
//! - `screen`: drawing, text, resize and presentation. The display is opened
//!   the first time a script requires it.
//! - `event`: handler registration for the events dispatched by
//!   `screen.present`, plus key queries.

mod event;
mod screen;
mod state;

use luascreen_engine::canvas::Canvas;
use luascreen_engine::config::ScreenConfig;
use mlua::{Lua, MultiValue, Table};

pub use state::DisplayOpener;

/// Registers the `screen` and `event` modules in `lua`.
///
/// `open` is called with `config` on the first `require "screen"`; if it
/// fails, the `require` raises the error.
pub fn install(lua: &Lua, config: ScreenConfig, open: DisplayOpener) -> mlua::Result<()> {
    lua.set_app_data(state::Setup { config, open });

    let preload: Table = lua.globals().get::<Table>("package")?.get("preload")?;

    let screen_loader = lua.create_function(|lua, _: MultiValue| {
        state::open(lua)?;
        screen::module(lua)
    })?;
    preload.set("screen", screen_loader)?;
    preload.set("event", lua.create_function(|lua, _: MultiValue| event::module(lua))?)?;

    Ok(())
}

/// Copy of the current render target, if the screen has been opened.
pub fn canvas_snapshot(lua: &Lua) -> Option<Canvas> {
    state::try_shared(lua).map(|screen| screen.borrow().canvas.clone())
}
