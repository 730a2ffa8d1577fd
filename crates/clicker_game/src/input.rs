//! Input channel: raw bytes in, logical keys out.
//!
//! Bytes arrive in arbitrary chunks. A multi-byte UTF-8 character or an
//! escape sequence may be split across chunks, so both are carried over.
//! A paste or fast typing yields several keys from one chunk; each is
//! dispatched separately, in order.
//!
//! ETX (Ctrl+C) is a side channel: it is never shown to handlers and ends
//! dispatch for the rest of the chunk.

use tracing::trace;

/// End of text, sent by Ctrl+C in raw mode.
pub const ETX: u8 = 0x03;

const ESC: char = '\x1b';
const MAX_CSI_PARAMS: usize = 16;

/// A normalized keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Carriage return or line feed.
    Enter,
    /// Horizontal tab.
    Tab,
    /// Shift+Tab.
    BackTab,
    /// DEL or BS.
    Backspace,
    /// A lone escape.
    Escape,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Forward delete.
    Delete,
}

impl Key {
    /// The character, lowercased, if this is a printable key.
    #[must_use]
    pub fn lower(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// Receiver of dispatched keys.
pub trait KeyHandler {
    /// Called once per key.
    fn handle_key(&mut self, key: Key);
}

impl<F: FnMut(Key)> KeyHandler for F {
    fn handle_key(&mut self, key: Key) {
        self(key);
    }
}

/// Result of feeding a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// All keys dispatched.
    Continue,
    /// ETX seen; the connection should be torn down.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Escape {
    #[default]
    Ground,
    Esc,
    Csi(String),
    Ss3,
}

/// Per-connection decoder and dispatcher.
#[derive(Default)]
pub struct InputChannel {
    utf8_carry: Vec<u8>,
    escape: Escape,
    observers: Vec<Box<dyn FnMut(Key) + Send>>,
}

impl InputChannel {
    /// Empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extra handler. Observers run after the primary handler,
    /// in registration order.
    pub fn on_key(&mut self, handler: impl FnMut(Key) + Send + 'static) {
        self.observers.push(Box::new(handler));
    }

    /// Decode a chunk and dispatch every complete key to `primary` and then
    /// to each observer.
    pub fn feed(&mut self, bytes: &[u8], primary: &mut dyn KeyHandler) -> Dispatch {
        if bytes.contains(&ETX) {
            let before = bytes.iter().position(|b| *b == ETX).unwrap_or(0);
            self.decode(&bytes[..before], primary);
            self.reset();
            trace!("Interrupt received");
            return Dispatch::Interrupted;
        }
        self.decode(bytes, primary);
        Dispatch::Continue
    }

    /// Decode without an ETX check and flush a lone escape at chunk end.
    fn decode(&mut self, bytes: &[u8], primary: &mut dyn KeyHandler) {
        self.utf8_carry.extend_from_slice(bytes);
        let text = take_complete_utf8(&mut self.utf8_carry);

        let mut keys = Vec::new();
        for ch in text.chars() {
            self.step(ch, &mut keys);
        }
        if self.escape == Escape::Esc {
            self.escape = Escape::Ground;
            keys.push(Key::Escape);
        }

        for key in keys {
            primary.handle_key(key);
            for observer in &mut self.observers {
                observer(key);
            }
        }
    }

    fn step(&mut self, ch: char, keys: &mut Vec<Key>) {
        match std::mem::take(&mut self.escape) {
            Escape::Ground => self.ground(ch, keys),
            Escape::Esc => match ch {
                '[' => self.escape = Escape::Csi(String::new()),
                'O' => self.escape = Escape::Ss3,
                ESC => {
                    keys.push(Key::Escape);
                    self.escape = Escape::Esc;
                }
                other => {
                    keys.push(Key::Escape);
                    self.ground(other, keys);
                }
            },
            Escape::Csi(mut params) => {
                if ('\x40'..='\x7e').contains(&ch) {
                    if let Some(key) = csi_key(&params, ch) {
                        keys.push(key);
                    }
                } else if params.len() < MAX_CSI_PARAMS {
                    params.push(ch);
                    self.escape = Escape::Csi(params);
                }
            }
            Escape::Ss3 => {
                if let Some(key) = csi_key("", ch) {
                    keys.push(key);
                }
            }
        }
    }

    fn ground(&mut self, ch: char, keys: &mut Vec<Key>) {
        let key = match ch {
            ESC => {
                self.escape = Escape::Esc;
                return;
            }
            '\r' | '\n' => Key::Enter,
            '\t' => Key::Tab,
            '\x7f' | '\x08' => Key::Backspace,
            c if c.is_control() => return,
            c => Key::Char(c),
        };
        keys.push(key);
    }

    fn reset(&mut self) {
        self.utf8_carry.clear();
        self.escape = Escape::Ground;
    }
}

impl std::fmt::Debug for InputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputChannel")
            .field("utf8_carry", &self.utf8_carry)
            .field("escape", &self.escape)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn csi_key(params: &str, final_byte: char) -> Option<Key> {
    match (params, final_byte) {
        (_, 'A') => Some(Key::Up),
        (_, 'B') => Some(Key::Down),
        (_, 'C') => Some(Key::Right),
        (_, 'D') => Some(Key::Left),
        (_, 'H') | ("1" | "7", '~') => Some(Key::Home),
        (_, 'F') | ("4" | "8", '~') => Some(Key::End),
        (_, 'Z') => Some(Key::BackTab),
        ("3", '~') => Some(Key::Delete),
        _ => None,
    }
}

/// Split off the longest valid UTF-8 prefix, leaving an incomplete trailing
/// sequence in `buf`. Invalid bytes are replaced.
fn take_complete_utf8(buf: &mut Vec<u8>) -> String {
    let mut text = String::new();
    loop {
        match std::str::from_utf8(buf) {
            Ok(valid) => {
                text.push_str(valid);
                buf.clear();
                return text;
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&buf[..valid_up_to]));
                match e.error_len() {
                    Some(bad) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        buf.drain(..valid_up_to + bad);
                    }
                    None => {
                        buf.drain(..valid_up_to);
                        return text;
                    }
                }
            }
        }
    }
}
