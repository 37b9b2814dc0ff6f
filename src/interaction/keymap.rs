use super::InputEvent;

/// A key press as reported by the display backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Escape,
    Other(u32),
}

/// Sentinel some backends report when no key was pressed during the poll
const NO_KEY: u32 = 255;

impl Key {
    /// Convert a raw key code (ASCII-style, as returned by highgui-like
    /// `wait_key` calls masked to a byte).
    pub fn from_code(code: u32) -> Option<Key> {
        match code {
            NO_KEY => None,
            10 | 13 => Some(Key::Enter),
            8 | 127 => Some(Key::Backspace),
            27 => Some(Key::Escape),
            _ => match char::from_u32(code) {
                Some(c) if !c.is_control() => Some(Key::Char(c)),
                _ => Some(Key::Other(code)),
            },
        }
    }
}

/// Result of mapping a key in the current state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Input(InputEvent),
    Quit,
}

/// Key bindings. The quit key quits in every state. While typing, every
/// other printable key (the start key included) is text.
#[derive(Clone, Copy, Debug)]
pub struct KeyMap {
    start_input: char,
    quit: char,
}

impl KeyMap {
    pub fn new(start_input: char, quit: char) -> Self {
        Self { start_input, quit }
    }

    pub fn start_input_key(&self) -> char {
        self.start_input
    }

    /// `None` means the key has no meaning here and is dropped.
    pub fn map(&self, key: Key, typing: bool) -> Option<KeyAction> {
        if key == Key::Char(self.quit) {
            return Some(KeyAction::Quit);
        }

        if typing {
            let event = match key {
                Key::Enter => InputEvent::Submit,
                Key::Backspace => InputEvent::Backspace,
                Key::Escape => InputEvent::Cancel,
                Key::Char(c) => InputEvent::Append(c),
                Key::Other(_) => return None,
            };
            return Some(KeyAction::Input(event));
        }

        match key {
            Key::Char(c) if c == self.start_input => Some(KeyAction::Input(InputEvent::StartInput)),
            _ => None,
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new('i', 'q')
    }
}
