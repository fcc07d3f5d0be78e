//! # Key Codes
//!
//! The synthetic keys a button can be mapped to.
//!
//! Names follow the conventions of desktop keyboard libraries (`"z"`, `"up"`,
//! `"shift"`, `"enter"`), so a button table reads the same way a person would
//! describe the key. Each key maps to a Linux input event code for uinput.

use std::fmt;
use std::str::FromStr;

use evdev::Key;

/// A keyboard key that can be pressed and released by the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    Up,
    Down,
    Left,
    Right,
    Shift,
    Ctrl,
    Alt,
    Enter,
    Space,
    Esc,
    Tab,
    Backspace,
}

/// Canonical name and Linux key code for every [`KeyCode`].
const KEY_TABLE: &[(KeyCode, &str, Key)] = &[
    (KeyCode::A, "a", Key::KEY_A),
    (KeyCode::B, "b", Key::KEY_B),
    (KeyCode::C, "c", Key::KEY_C),
    (KeyCode::D, "d", Key::KEY_D),
    (KeyCode::E, "e", Key::KEY_E),
    (KeyCode::F, "f", Key::KEY_F),
    (KeyCode::G, "g", Key::KEY_G),
    (KeyCode::H, "h", Key::KEY_H),
    (KeyCode::I, "i", Key::KEY_I),
    (KeyCode::J, "j", Key::KEY_J),
    (KeyCode::K, "k", Key::KEY_K),
    (KeyCode::L, "l", Key::KEY_L),
    (KeyCode::M, "m", Key::KEY_M),
    (KeyCode::N, "n", Key::KEY_N),
    (KeyCode::O, "o", Key::KEY_O),
    (KeyCode::P, "p", Key::KEY_P),
    (KeyCode::Q, "q", Key::KEY_Q),
    (KeyCode::R, "r", Key::KEY_R),
    (KeyCode::S, "s", Key::KEY_S),
    (KeyCode::T, "t", Key::KEY_T),
    (KeyCode::U, "u", Key::KEY_U),
    (KeyCode::V, "v", Key::KEY_V),
    (KeyCode::W, "w", Key::KEY_W),
    (KeyCode::X, "x", Key::KEY_X),
    (KeyCode::Y, "y", Key::KEY_Y),
    (KeyCode::Z, "z", Key::KEY_Z),
    (KeyCode::Num0, "0", Key::KEY_0),
    (KeyCode::Num1, "1", Key::KEY_1),
    (KeyCode::Num2, "2", Key::KEY_2),
    (KeyCode::Num3, "3", Key::KEY_3),
    (KeyCode::Num4, "4", Key::KEY_4),
    (KeyCode::Num5, "5", Key::KEY_5),
    (KeyCode::Num6, "6", Key::KEY_6),
    (KeyCode::Num7, "7", Key::KEY_7),
    (KeyCode::Num8, "8", Key::KEY_8),
    (KeyCode::Num9, "9", Key::KEY_9),
    (KeyCode::Up, "up", Key::KEY_UP),
    (KeyCode::Down, "down", Key::KEY_DOWN),
    (KeyCode::Left, "left", Key::KEY_LEFT),
    (KeyCode::Right, "right", Key::KEY_RIGHT),
    (KeyCode::Shift, "shift", Key::KEY_LEFTSHIFT),
    (KeyCode::Ctrl, "ctrl", Key::KEY_LEFTCTRL),
    (KeyCode::Alt, "alt", Key::KEY_LEFTALT),
    (KeyCode::Enter, "enter", Key::KEY_ENTER),
    (KeyCode::Space, "space", Key::KEY_SPACE),
    (KeyCode::Esc, "esc", Key::KEY_ESC),
    (KeyCode::Tab, "tab", Key::KEY_TAB),
    (KeyCode::Backspace, "backspace", Key::KEY_BACKSPACE),
];

/// Alternative spellings accepted by [`KeyCode::from_str`].
const KEY_ALIASES: &[(&str, KeyCode)] = &[
    ("return", KeyCode::Enter),
    ("escape", KeyCode::Esc),
    ("control", KeyCode::Ctrl),
];

impl KeyCode {
    /// Every supported key, in table order.
    pub fn all() -> impl Iterator<Item = KeyCode> {
        KEY_TABLE.iter().map(|(code, _, _)| *code)
    }

    /// Canonical lowercase name of the key.
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Linux input key code used when emitting through uinput.
    pub fn to_evdev(self) -> Key {
        self.entry().2
    }

    fn entry(self) -> &'static (KeyCode, &'static str, Key) {
        // Every variant has exactly one row in KEY_TABLE.
        KEY_TABLE
            .iter()
            .find(|(code, _, _)| *code == self)
            .unwrap_or_else(|| unreachable!("{:?} missing from KEY_TABLE", self))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();

        KEY_TABLE
            .iter()
            .find(|(_, name, _)| *name == wanted)
            .map(|(code, _, _)| *code)
            .or_else(|| {
                KEY_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == wanted)
                    .map(|(_, code)| *code)
            })
            .ok_or_else(|| format!("unknown key name '{}'", s))
    }
}
