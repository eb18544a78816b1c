//! The `event` Lua module and the events dispatched during `screen.present`.

use luascreen_engine::core::DisplayEvent;
use luascreen_engine::input::{
    InputEvent, Key, KeyState, MouseButtonState, PointerButtonEvent, PointerMoveEvent, TextEvent,
};
use mlua::{Function, IntoLua, Lua, MultiValue, Table, Value};

use crate::state;

/// Registry slot holding `{ [event name] = { handler, ... } }`.
const HANDLERS_KEY: &str = "luascreen.event.handlers";

/// An event as scripts see it: a name plus positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScriptEvent {
    Resize(u32, u32),
    Quit,
    KeyDown(&'static str, bool),
    KeyUp(&'static str),
    MouseMove(i64, i64),
    MouseDown(&'static str, i64, i64),
    MouseUp(&'static str, i64, i64),
    Wheel(f32, f32),
    Text(String),
    Focus(bool),
}

impl ScriptEvent {
    /// Maps a display event; pointer positions are divided by `scale` so they
    /// match drawing coordinates.
    pub fn from_display(event: &DisplayEvent, scale: i32) -> Option<Self> {
        let logical = |v: f32| (v / scale.max(1) as f32).floor() as i64;

        let input = match event {
            DisplayEvent::Resized { width, height } => return Some(Self::Resize(*width, *height)),
            DisplayEvent::CloseRequested => return Some(Self::Quit),
            DisplayEvent::Input(input) => input,
        };

        match input {
            InputEvent::Key { key, state: KeyState::Pressed, repeat, .. } => {
                Some(Self::KeyDown(key.name(), *repeat))
            }
            InputEvent::Key { key, state: KeyState::Released, .. } => Some(Self::KeyUp(key.name())),
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                Some(Self::MouseMove(logical(*x), logical(*y)))
            }
            InputEvent::PointerButton(PointerButtonEvent { button, state, x, y, .. }) => {
                let (x, y) = (logical(*x), logical(*y));
                Some(match state {
                    MouseButtonState::Pressed => Self::MouseDown(button.name(), x, y),
                    MouseButtonState::Released => Self::MouseUp(button.name(), x, y),
                })
            }
            InputEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = delta.xy();
                Some(Self::Wheel(dx, dy))
            }
            InputEvent::Text(TextEvent { text }) => Some(Self::Text(text.clone())),
            InputEvent::Focused(focused) => Some(Self::Focus(*focused)),
            InputEvent::ModifiersChanged(_) | InputEvent::PointerLeft => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize(..) => "resize",
            Self::Quit => "quit",
            Self::KeyDown(..) => "keydown",
            Self::KeyUp(..) => "keyup",
            Self::MouseMove(..) => "mousemove",
            Self::MouseDown(..) => "mousedown",
            Self::MouseUp(..) => "mouseup",
            Self::Wheel(..) => "wheel",
            Self::Text(..) => "text",
            Self::Focus(..) => "focus",
        }
    }

    fn args(&self, lua: &Lua) -> mlua::Result<Vec<Value>> {
        Ok(match self {
            Self::Resize(w, h) => vec![w.into_lua(lua)?, h.into_lua(lua)?],
            Self::Quit => Vec::new(),
            Self::KeyDown(key, repeat) => vec![key.into_lua(lua)?, repeat.into_lua(lua)?],
            Self::KeyUp(key) => vec![key.into_lua(lua)?],
            Self::MouseMove(x, y) => vec![x.into_lua(lua)?, y.into_lua(lua)?],
            Self::MouseDown(button, x, y) | Self::MouseUp(button, x, y) => {
                vec![button.into_lua(lua)?, x.into_lua(lua)?, y.into_lua(lua)?]
            }
            Self::Wheel(dx, dy) => vec![dx.into_lua(lua)?, dy.into_lua(lua)?],
            Self::Text(text) => vec![text.as_str().into_lua(lua)?],
            Self::Focus(focused) => vec![focused.into_lua(lua)?],
        })
    }
}

fn handlers(lua: &Lua) -> mlua::Result<Table> {
    if let Some(table) = lua.named_registry_value::<Option<Table>>(HANDLERS_KEY)? {
        return Ok(table);
    }
    let table = lua.create_table()?;
    lua.set_named_registry_value(HANDLERS_KEY, table.clone())?;
    Ok(table)
}

/// Calls every handler registered for `event` as `fn(name, ...)`.
///
/// Handlers added or removed while dispatching take effect from the next
/// event. Returns the number of handlers called.
pub(crate) fn emit(lua: &Lua, event: &ScriptEvent) -> mlua::Result<usize> {
    let Some(list) = handlers(lua)?.raw_get::<Option<Table>>(event.name())? else {
        return Ok(0);
    };
    let callbacks = list
        .sequence_values::<Function>()
        .collect::<mlua::Result<Vec<_>>>()?;
    if callbacks.is_empty() {
        return Ok(0);
    }

    let args = event.args(lua)?;
    for callback in &callbacks {
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(event.name().into_lua(lua)?);
        call_args.extend(args.iter().cloned());
        callback.call::<()>(MultiValue::from_vec(call_args))?;
    }
    Ok(callbacks.len())
}

fn on(lua: &Lua, (name, callback): (String, Function)) -> mlua::Result<()> {
    let table = handlers(lua)?;
    let list = match table.raw_get::<Option<Table>>(name.as_str())? {
        Some(list) => list,
        None => {
            let list = lua.create_table()?;
            table.raw_set(name.as_str(), list.clone())?;
            list
        }
    };
    list.raw_set(list.raw_len() + 1, callback)
}

fn off(lua: &Lua, (name, callback): (String, Option<Function>)) -> mlua::Result<()> {
    let table = handlers(lua)?;
    let Some(callback) = callback else {
        return table.raw_set(name.as_str(), Value::Nil);
    };
    let Some(list) = table.raw_get::<Option<Table>>(name.as_str())? else {
        return Ok(());
    };

    let kept = lua.create_sequence_from(
        list.sequence_values::<Function>()
            .collect::<mlua::Result<Vec<_>>>()?
            .into_iter()
            .filter(|f| *f != callback),
    )?;
    table.raw_set(name.as_str(), kept)
}

fn is_down(lua: &Lua, name: String) -> mlua::Result<bool> {
    let Some(key) = Key::from_name(&name) else {
        return Err(mlua::Error::runtime(format!("unknown key name {name:?}")));
    };
    Ok(state::try_shared(lua).is_some_and(|screen| screen.borrow().input.key_down(key)))
}

fn quit(lua: &Lua, _: ()) -> mlua::Result<()> {
    if let Some(screen) = state::try_shared(lua) {
        screen.borrow_mut().request_quit();
    }
    Ok(())
}

/// Builds the `event` module table.
pub(crate) fn module(lua: &Lua) -> mlua::Result<Table> {
    let module = lua.create_table()?;
    module.set("on", lua.create_function(on)?)?;
    module.set("off", lua.create_function(off)?)?;
    module.set("isDown", lua.create_function(is_down)?)?;
    module.set("quit", lua.create_function(quit)?)?;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luascreen_engine::input::{Modifiers, MouseButton, MouseWheelDelta};

    fn input(ev: InputEvent) -> DisplayEvent {
        DisplayEvent::Input(ev)
    }

    #[test]
    fn pointer_positions_are_divided_by_scale() {
        let ev = input(InputEvent::PointerMoved(PointerMoveEvent { x: 9.5, y: 4.0 }));
        assert_eq!(ScriptEvent::from_display(&ev, 2), Some(ScriptEvent::MouseMove(4, 2)));
    }

    #[test]
    fn button_events_carry_name_and_position() {
        let ev = input(InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Right,
            state: MouseButtonState::Released,
            x: 30.0,
            y: 12.0,
            modifiers: Modifiers::default(),
        }));
        assert_eq!(ScriptEvent::from_display(&ev, 3), Some(ScriptEvent::MouseUp("right", 10, 4)));
    }

    #[test]
    fn key_events_use_script_names() {
        let ev = input(InputEvent::Key {
            key: Key::ArrowLeft,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: true,
        });
        let mapped = ScriptEvent::from_display(&ev, 1).unwrap();
        assert_eq!(mapped, ScriptEvent::KeyDown("left", true));
        assert_eq!(mapped.name(), "keydown");
    }

    #[test]
    fn resize_keeps_physical_size() {
        let ev = DisplayEvent::Resized { width: 801, height: 599 };
        assert_eq!(ScriptEvent::from_display(&ev, 2), Some(ScriptEvent::Resize(801, 599)));
    }

    #[test]
    fn wheel_and_modifier_events() {
        let wheel = input(InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: -1.0 },
            modifiers: Modifiers::default(),
        });
        assert_eq!(ScriptEvent::from_display(&wheel, 2), Some(ScriptEvent::Wheel(0.0, -1.0)));

        let mods = input(InputEvent::ModifiersChanged(Modifiers::default()));
        assert_eq!(ScriptEvent::from_display(&mods, 2), None);
    }
}
