//! Hotkey chords (`ctrl+alt+t`) and a tracker that recognises them in a
//! stream of `rdev` key events.

use std::fmt;
use std::str::FromStr;

use rdev::{EventType, Key};

use super::{parse_key, HotkeyError};

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Set the flag named by `token`; `false` if `token` is not a modifier.
    fn set_named(&mut self, token: &str) -> bool {
        let flag = match token {
            "ctrl" | "control" => &mut self.ctrl,
            "shift" => &mut self.shift,
            "alt" | "option" => &mut self.alt,
            "meta" | "super" | "win" | "cmd" => &mut self.meta,
            _ => return false,
        };
        *flag = true;
        true
    }

    fn from_held(held: &[Key]) -> Self {
        let mut modifiers = Self::default();
        for key in held {
            match key {
                Key::ControlLeft | Key::ControlRight => modifiers.ctrl = true,
                Key::ShiftLeft | Key::ShiftRight => modifiers.shift = true,
                Key::Alt | Key::AltGr => modifiers.alt = true,
                Key::MetaLeft | Key::MetaRight => modifiers.meta = true,
                _ => {}
            }
        }
        modifiers
    }
}

fn is_modifier(key: Key) -> bool {
    matches!(
        key,
        Key::ControlLeft
            | Key::ControlRight
            | Key::ShiftLeft
            | Key::ShiftRight
            | Key::Alt
            | Key::AltGr
            | Key::MetaLeft
            | Key::MetaRight
    )
}

// ---------------------------------------------------------------------------
// Hotkey
// ---------------------------------------------------------------------------

/// A set of modifiers plus one non-modifier key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    /// Parse a `+`-separated chord.  Tokens are case-insensitive; the last one
    /// names the key, the others must be modifiers.
    ///
    /// ```
    /// use polar_translate::hotkey::Hotkey;
    ///
    /// let hotkey: Hotkey = "Ctrl+Alt+T".parse().unwrap();
    /// assert!(hotkey.modifiers.ctrl && hotkey.modifiers.alt);
    /// assert_eq!(hotkey.key, rdev::Key::KeyT);
    /// assert!("ctrl+alt".parse::<Hotkey>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(HotkeyError::Empty);
        }

        let tokens: Vec<String> = s.split('+').map(|t| t.trim().to_ascii_lowercase()).collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(HotkeyError::InvalidChord(s.to_string()));
        }

        let Some((last, leading)) = tokens.split_last() else {
            return Err(HotkeyError::Empty);
        };

        let mut modifiers = Modifiers::default();
        for token in leading {
            if !modifiers.set_named(token) {
                return Err(HotkeyError::InvalidChord(s.to_string()));
            }
        }

        if Modifiers::default().set_named(last) {
            // Only modifiers, no key.
            return Err(HotkeyError::InvalidChord(s.to_string()));
        }
        let key = parse_key(last).ok_or_else(|| HotkeyError::UnknownKey(last.clone()))?;

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.modifiers.ctrl, "ctrl"),
            (self.modifiers.shift, "shift"),
            (self.modifiers.alt, "alt"),
            (self.modifiers.meta, "meta"),
        ];
        for (_, name) in names.iter().filter(|(on, _)| *on) {
            write!(f, "{name}+")?;
        }

        let key = format!("{:?}", self.key);
        let short = key
            .strip_prefix("Key")
            .or_else(|| key.strip_prefix("Num").filter(|d| d.len() == 1))
            .unwrap_or(&key);
        write!(f, "{}", short.to_ascii_lowercase())
    }
}

// ---------------------------------------------------------------------------
// ChordTracker
// ---------------------------------------------------------------------------

/// Follows modifier state across key events and reports each fresh
/// non-modifier key press together with the modifiers held at that moment.
///
/// OS auto-repeat delivers repeated presses without releases; those are
/// swallowed so a held chord fires once.
#[derive(Debug, Default)]
pub struct ChordTracker {
    held: Vec<Key>,
    last_pressed: Option<Key>,
}

impl ChordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: &EventType) -> Option<Hotkey> {
        match *event {
            EventType::KeyPress(key) if is_modifier(key) => {
                if !self.held.contains(&key) {
                    self.held.push(key);
                }
                None
            }
            EventType::KeyRelease(key) if is_modifier(key) => {
                self.held.retain(|k| *k != key);
                None
            }
            EventType::KeyPress(key) => {
                if self.last_pressed == Some(key) {
                    return None;
                }
                self.last_pressed = Some(key);
                Some(Hotkey {
                    modifiers: Modifiers::from_held(&self.held),
                    key,
                })
            }
            EventType::KeyRelease(key) => {
                if self.last_pressed == Some(key) {
                    self.last_pressed = None;
                }
                None
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
