//! The `screen` Lua module.
//!
//! Every function forwards to the shared [`ScreenState`]; coordinates are
//! logical pixels (`scale` x `scale` canvas pixels each).

use std::path::Path;

use luascreen_engine::coords::Rect;
use luascreen_engine::paint::Color;
use luascreen_engine::text::{BitmapFont, FontSpec};
use mlua::{FromLua, Lua, MultiValue, Table, Value};

use crate::event::{self, ScriptEvent};
use crate::state::{self, ScreenState};

/// Runs `f` against the open screen.
///
/// The borrow ends when `f` returns; never call back into Lua from `f`.
fn with_screen<R>(lua: &Lua, f: impl FnOnce(&mut ScreenState) -> mlua::Result<R>) -> mlua::Result<R> {
    let screen = state::shared(lua)?;
    let mut state = screen.borrow_mut();
    f(&mut state)
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Boolean(false))
}

/// An integer argument. Floats are accepted only when they are whole.
#[derive(Debug, Copy, Clone)]
struct Int(i64);

impl FromLua for Int {
    fn from_lua(value: Value, _: &Lua) -> mlua::Result<Self> {
        match value {
            Value::Integer(i) => Ok(Int(i)),
            // `i64::MAX as f64` rounds up to 2^63, one past the range.
            Value::Number(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 => {
                Ok(Int(n as i64))
            }
            Value::Number(n) => Err(mlua::Error::runtime(format!(
                "number {n} has no integer representation"
            ))),
            other => Err(mlua::Error::runtime(format!(
                "integer expected, got {}",
                other.type_name()
            ))),
        }
    }
}

impl Int {
    /// Narrows to a drawing coordinate.
    fn coord(self) -> mlua::Result<i32> {
        i32::try_from(self.0)
            .map_err(|_| mlua::Error::runtime(format!("coordinate {} is out of range", self.0)))
    }
}

fn get_width(lua: &Lua, _: ()) -> mlua::Result<u32> {
    with_screen(lua, |s| Ok(s.painter.logical_size(&s.canvas).0))
}

fn get_height(lua: &Lua, _: ()) -> mlua::Result<u32> {
    with_screen(lua, |s| Ok(s.painter.logical_size(&s.canvas).1))
}

fn get_scale(lua: &Lua, _: ()) -> mlua::Result<i32> {
    with_screen(lua, |s| Ok(s.painter.scale()))
}

fn set_scale(lua: &Lua, Int(scale): Int) -> mlua::Result<()> {
    with_screen(lua, |s| s.painter.set_scale(scale).map_err(mlua::Error::runtime))
}

fn colour(lua: &Lua, (r, g, b, a): (Int, Option<Int>, Option<Int>, Option<Int>)) -> mlua::Result<()> {
    let channel = |c: Option<Int>| c.map(|Int(v)| v);
    let (r, g, b, a) = (r.0, channel(g), channel(b), channel(a));
    with_screen(lua, |s| {
        s.painter.set_color(Color::from_channels(r, g, b, a));
        Ok(())
    })
}

fn get_colour(lua: &Lua, _: ()) -> mlua::Result<(u8, u8, u8, u8)> {
    with_screen(lua, |s| {
        let Color { r, g, b, a } = s.painter.color();
        Ok((r, g, b, a))
    })
}

fn pixel(lua: &Lua, (x, y): (Int, Int)) -> mlua::Result<()> {
    let (x, y) = (x.coord()?, y.coord()?);
    with_screen(lua, |s| {
        s.painter.point(&mut s.canvas, x, y);
        Ok(())
    })
}

fn rect(lua: &Lua, (x, y, w, h, fill): (Int, Int, Int, Int, Value)) -> mlua::Result<()> {
    let rect = Rect::new(x.coord()?, y.coord()?, w.coord()?, h.coord()?);
    with_screen(lua, |s| {
        if truthy(&fill) {
            s.painter.fill_rect(&mut s.canvas, rect);
        } else {
            s.painter.rect_outline(&mut s.canvas, rect);
        }
        Ok(())
    })
}

fn clear(lua: &Lua, _: ()) -> mlua::Result<()> {
    with_screen(lua, |s| {
        s.painter.clear(&mut s.canvas);
        Ok(())
    })
}

fn no_font() -> mlua::Error {
    mlua::Error::runtime("no font loaded; call screen.loadFont first")
}

fn draw_char(lua: &Lua, (text, x, y): (mlua::String, Int, Int)) -> mlua::Result<i32> {
    let (x, y) = (x.coord()?, y.coord()?);
    let bytes = text.as_bytes();
    with_screen(lua, |s| {
        let font = s.font.as_ref().ok_or_else(no_font)?;
        let Some(&code) = bytes.first() else {
            return Ok(0);
        };
        Ok(font.draw_char(&mut s.canvas, &s.painter, x, y, code))
    })
}

fn write(lua: &Lua, (text, x, y): (mlua::String, Int, Int)) -> mlua::Result<i32> {
    let (x, y) = (x.coord()?, y.coord()?);
    let bytes = text.as_bytes();
    with_screen(lua, |s| {
        let font = s.font.as_ref().ok_or_else(no_font)?;
        Ok(font.draw_text(&mut s.canvas, &s.painter, &bytes, x, y))
    })
}

fn text_width(lua: &Lua, text: mlua::String) -> mlua::Result<i32> {
    let bytes = text.as_bytes();
    with_screen(lua, |s| Ok(s.font.as_ref().map_or(0, |font| font.text_width(&bytes))))
}

fn is_vector_font(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
}

fn spacing_opt(opts: &Table) -> mlua::Result<i32> {
    opts.get::<Option<Int>>("spacing")?.map_or(Ok(0), Int::coord)
}

/// `loadFont(sheet, glyph_w, glyph_h [, opts])` or `loadFont(font.ttf, size [, opts])`.
fn load_font(lua: &Lua, (path, rest): (String, MultiValue)) -> mlua::Result<()> {
    let path_ref = Path::new(&path);

    let font = if is_vector_font(path_ref) {
        let (size, opts): (f32, Option<Table>) = lua.unpack_multi(rest)?;
        let spacing = match &opts {
            Some(opts) => spacing_opt(opts)?,
            None => 0,
        };
        let bytes = std::fs::read(path_ref)
            .map_err(|e| mlua::Error::runtime(format!("cannot read font {path}: {e}")))?;
        BitmapFont::from_ttf(&bytes, size, spacing)
    } else {
        let (Int(glyph_w), Int(glyph_h), opts): (Int, Int, Option<Table>) = lua.unpack_multi(rest)?;
        let cell = |v: i64| {
            u32::try_from(v).map_err(|_| mlua::Error::runtime(format!("glyph size must not be negative, got {v}")))
        };
        let mut spec = FontSpec::new(cell(glyph_w)?, cell(glyph_h)?);
        if let Some(opts) = opts {
            if let Some(Int(first)) = opts.get::<Option<Int>>("first")? {
                spec.first_char = u8::try_from(first).map_err(|_| {
                    mlua::Error::runtime(format!("first character code must be 0..255, got {first}"))
                })?;
            }
            spec.spacing = spacing_opt(&opts)?;
            spec.proportional = opts.get::<Option<bool>>("proportional")?.unwrap_or(false);
        }
        BitmapFont::load(path_ref, spec)
    }
    .map_err(mlua::Error::runtime)?;

    log::info!(
        "loaded font {path} ({} glyphs, {}x{} cells)",
        font.glyph_count(),
        font.cell_width(),
        font.line_height()
    );

    with_screen(lua, |s| {
        s.font = Some(font);
        Ok(())
    })
}

/// `resize(_, w, h)`: the first argument is ignored so the function can be
/// registered as a `resize` handler directly.
fn resize(lua: &Lua, (_, Int(w), Int(h)): (Value, Int, Int)) -> mlua::Result<()> {
    let size = |v: i64| u32::try_from(v).ok().filter(|v| *v >= 1);
    let (Some(width), Some(height)) = (size(w), size(h)) else {
        return Err(mlua::Error::runtime(format!(
            "render target size must be positive, got {w}x{h}"
        )));
    };

    with_screen(lua, |s| {
        log::debug!(
            "resizing render target {}x{} -> {width}x{height}",
            s.canvas.width(),
            s.canvas.height()
        );
        s.canvas = s.canvas.resized(width, height);
        Ok(())
    })
}

fn present(lua: &Lua, _: ()) -> mlua::Result<bool> {
    let screen = state::shared(lua)?;
    let events = screen
        .borrow_mut()
        .present()
        .map_err(|e| mlua::Error::runtime(format!("present failed: {e:#}")))?;

    // No borrow is held here: handlers may call back into `screen`.
    // A failing handler does not stop the remaining events; the first error
    // is raised once the frame is finished.
    let mut first_error = None;
    for ev in &events {
        match event::emit(lua, ev) {
            Ok(0) if *ev == ScriptEvent::Quit => screen.borrow_mut().request_quit(),
            Ok(_) => {}
            Err(e) => {
                log::debug!("{} handler failed: {e}", ev.name());
                first_error.get_or_insert(e);
            }
        }
    }

    let open = screen.borrow_mut().finish_frame();
    match first_error {
        Some(e) => Err(e),
        None => Ok(open),
    }
}

fn get_delta(lua: &Lua, _: ()) -> mlua::Result<f32> {
    with_screen(lua, |s| Ok(s.delta()))
}

fn set_title(lua: &Lua, title: String) -> mlua::Result<()> {
    with_screen(lua, |s| {
        s.set_title(&title);
        Ok(())
    })
}

/// Builds the `screen` module table.
pub(crate) fn module(lua: &Lua) -> mlua::Result<Table> {
    let module = lua.create_table()?;

    module.set("getWidth", lua.create_function(get_width)?)?;
    module.set("getHeight", lua.create_function(get_height)?)?;
    module.set("getScale", lua.create_function(get_scale)?)?;
    module.set("setScale", lua.create_function(set_scale)?)?;

    let colour = lua.create_function(colour)?;
    module.set("colour", colour.clone())?;
    module.set("color", colour)?;
    let get_colour = lua.create_function(get_colour)?;
    module.set("getColour", get_colour.clone())?;
    module.set("getColor", get_colour)?;

    module.set("pixel", lua.create_function(pixel)?)?;
    module.set("rect", lua.create_function(rect)?)?;
    module.set("clear", lua.create_function(clear)?)?;

    module.set("char", lua.create_function(draw_char)?)?;
    module.set("write", lua.create_function(write)?)?;
    module.set("textWidth", lua.create_function(text_width)?)?;
    module.set("loadFont", lua.create_function(load_font)?)?;

    module.set("resize", lua.create_function(resize)?)?;
    module.set("present", lua.create_function(present)?)?;
    module.set("getDelta", lua.create_function(get_delta)?)?;
    module.set("setTitle", lua.create_function(set_title)?)?;

    Ok(module)
}
