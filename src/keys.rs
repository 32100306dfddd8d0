//! Key names accepted by the `send_key` command.
//!
//! The server resolves names to a platform-neutral [`Key`]; the host maps
//! that onto whatever scancode type its input layer uses.

use std::fmt;

/// A keyboard key a remote client can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Space bar.
    Space,
    /// Backtick / grave accent (commonly toggles a debug console).
    Grave,
    /// Backspace.
    Backspace,
    /// Tab.
    Tab,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Left shift.
    LeftShift,
    /// Right shift.
    RightShift,
    /// Left control.
    LeftCtrl,
    /// Right control.
    RightCtrl,
    /// Left alt.
    LeftAlt,
    /// Right alt.
    RightAlt,
    /// Function key `F1`..=`F12`.
    F(u8),
    /// Lowercase ASCII letter, digit, or unshifted punctuation key.
    Char(char),
}

impl Key {
    /// Resolves a client-supplied key name, ignoring ASCII case.
    ///
    /// Short names (`lctrl`) and SDL's long names (`Left Ctrl`) are both
    /// accepted. Returns `None` for names this server does not know,
    /// including names with surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "enter" | "return" => Self::Enter,
            "esc" | "escape" => Self::Escape,
            "space" => Self::Space,
            "grave" | "backtick" | "`" => Self::Grave,
            "backspace" => Self::Backspace,
            "tab" => Self::Tab,
            "delete" | "del" => Self::Delete,
            "insert" => Self::Insert,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" | "page up" => Self::PageUp,
            "pagedown" | "page down" => Self::PageDown,
            "shift" | "lshift" | "left shift" => Self::LeftShift,
            "rshift" | "right shift" => Self::RightShift,
            "ctrl" | "lctrl" | "left ctrl" => Self::LeftCtrl,
            "rctrl" | "right ctrl" => Self::RightCtrl,
            "alt" | "lalt" | "left alt" => Self::LeftAlt,
            "ralt" | "right alt" => Self::RightAlt,
            other => return Self::function_key(other).or_else(|| Self::single_char(other)),
        };
        Some(key)
    }

    fn function_key(name: &str) -> Option<Self> {
        let n: u8 = name.strip_prefix('f')?.parse().ok()?;
        (1..=12).contains(&n).then_some(Self::F(n))
    }

    fn single_char(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Some(Self::Char(c)),
            (Some(c @ ('-' | '=' | '[' | ']' | '\\' | ';' | '\'' | ',' | '.' | '/')), None) => {
                Some(Self::Char(c))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F(n) => write!(f, "f{n}"),
            Self::Char(c) => write!(f, "{c}"),
            other => f.write_str(&format!("{other:?}").to_ascii_lowercase()),
        }
    }
}
