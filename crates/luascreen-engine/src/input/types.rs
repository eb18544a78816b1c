use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps platform keycodes into these variants where possible.
/// For unsupported keys, `Key::Unknown(u32)` carries the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

/// Script-facing key names.
const KEY_NAMES: &[(Key, &str)] = &[
    (Key::Escape, "escape"),
    (Key::Enter, "return"),
    (Key::Tab, "tab"),
    (Key::Backspace, "backspace"),
    (Key::Space, "space"),
    (Key::Insert, "insert"),
    (Key::Delete, "delete"),
    (Key::Home, "home"),
    (Key::End, "end"),
    (Key::PageUp, "pageup"),
    (Key::PageDown, "pagedown"),
    (Key::ArrowUp, "up"),
    (Key::ArrowDown, "down"),
    (Key::ArrowLeft, "left"),
    (Key::ArrowRight, "right"),
    (Key::Shift, "shift"),
    (Key::Control, "ctrl"),
    (Key::Alt, "alt"),
    (Key::Meta, "meta"),
    (Key::A, "a"), (Key::B, "b"), (Key::C, "c"), (Key::D, "d"), (Key::E, "e"),
    (Key::F, "f"), (Key::G, "g"), (Key::H, "h"), (Key::I, "i"), (Key::J, "j"),
    (Key::K, "k"), (Key::L, "l"), (Key::M, "m"), (Key::N, "n"), (Key::O, "o"),
    (Key::P, "p"), (Key::Q, "q"), (Key::R, "r"), (Key::S, "s"), (Key::T, "t"),
    (Key::U, "u"), (Key::V, "v"), (Key::W, "w"), (Key::X, "x"), (Key::Y, "y"),
    (Key::Z, "z"),
    (Key::Digit0, "0"), (Key::Digit1, "1"), (Key::Digit2, "2"), (Key::Digit3, "3"),
    (Key::Digit4, "4"), (Key::Digit5, "5"), (Key::Digit6, "6"), (Key::Digit7, "7"),
    (Key::Digit8, "8"), (Key::Digit9, "9"),
    (Key::F1, "f1"), (Key::F2, "f2"), (Key::F3, "f3"), (Key::F4, "f4"),
    (Key::F5, "f5"), (Key::F6, "f6"), (Key::F7, "f7"), (Key::F8, "f8"),
    (Key::F9, "f9"), (Key::F10, "f10"), (Key::F11, "f11"), (Key::F12, "f12"),
];

impl Key {
    /// Lower-case name used by scripts (`"a"`, `"escape"`, `"f1"`, ...).
    pub fn name(self) -> &'static str {
        KEY_NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map_or("unknown", |(_, name)| name)
    }

    /// Parses a script key name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Key> {
        KEY_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(k, _)| *k)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
            MouseButton::Back => "back",
            MouseButton::Forward => "forward",
            MouseButton::Other(_) => "other",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    pub fn xy(self) -> (f32, f32) {
        match self {
            MouseWheelDelta::Line { x, y } | MouseWheelDelta::Pixel { x, y } => (x, y),
        }
    }
}

/// Pointer move event in physical window pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Pointer button event, in physical window pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

/// Committed text (not IME composition).
#[derive(Debug, Clone, PartialEq)]
pub struct TextEvent {
    pub text: String,
}

/// Platform-agnostic input events emitted by the display.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),

    MouseWheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },

    Text(TextEvent),

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_round_trip() {
        for (key, name) in KEY_NAMES {
            assert_eq!(Key::from_name(name), Some(*key));
            assert_eq!(key.name(), *name);
        }
    }

    #[test]
    fn from_name_ignores_case() {
        assert_eq!(Key::from_name("Escape"), Some(Key::Escape));
        assert_eq!(Key::from_name("F12"), Some(Key::F12));
    }

    #[test]
    fn unknown_key_name() {
        assert_eq!(Key::Unknown(77).name(), "unknown");
        assert_eq!(Key::from_name("hyper"), None);
    }

    #[test]
    fn wheel_delta_components() {
        assert_eq!(MouseWheelDelta::Line { x: 1.0, y: -2.0 }.xy(), (1.0, -2.0));
    }
}
