//! Global hotkeys, backed by `rdev`.
//!
//! * [`HotkeyManager`]: register chord callbacks, start/stop listening.
//! * [`RdevHotkeyManager`]: implementation on a dedicated `rdev::listen`
//!   thread.
//! * [`Hotkey`] / [`ChordTracker`]: `ctrl+alt+t` style chords.
//!
//! Callbacks run on the listener thread.  The app uses
//! [`forwarding_callback`] to turn a chord into a [`HotkeyEvent`] on a
//! `tokio::sync::mpsc` channel that the UI drains every frame.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use polar_translate::hotkey::{
//!     forwarding_callback, HotkeyEvent, HotkeyManager, RdevHotkeyManager,
//! };
//!
//! let (tx, mut rx) = mpsc::channel(16);
//! let mut hotkeys = RdevHotkeyManager::new();
//! hotkeys
//!     .register("ctrl+alt+t", forwarding_callback(tx, HotkeyEvent::ClipboardTranslation, || {}))
//!     .expect("valid hotkey");
//! hotkeys.start_listening().expect("listener thread");
//!
//! // Once per UI frame:
//! while let Ok(event) = rx.try_recv() {
//!     println!("{event:?}");
//! }
//! ```

pub mod chord;
pub mod manager;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

pub use chord::{ChordTracker, Hotkey, Modifiers};
pub use manager::RdevHotkeyManager;

// ---------------------------------------------------------------------------
// HotkeyEvent
// ---------------------------------------------------------------------------

/// Events posted by hotkey callbacks to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Translate the clipboard text and show the result in a pop-up.
    ClipboardTranslation,
}

// ---------------------------------------------------------------------------
// HotkeyError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("hotkey is empty")]
    Empty,

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// Not `modifier+...+key`.
    #[error("invalid hotkey '{0}': expected modifiers followed by one key, e.g. ctrl+alt+t")]
    InvalidChord(String),

    #[error("cannot start hotkey listener: {0}")]
    Listener(String),
}

// ---------------------------------------------------------------------------
// HotkeyManager
// ---------------------------------------------------------------------------

pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

pub trait HotkeyManager: Send {
    /// Bind `callback` to `hotkey`, replacing any existing binding for the
    /// same chord.
    fn register(&mut self, hotkey: &str, callback: HotkeyCallback) -> Result<(), HotkeyError>;

    /// Remove the binding for `hotkey`.  Returns `false` if there was none.
    fn unregister(&mut self, hotkey: &str) -> bool;

    fn start_listening(&mut self) -> Result<(), HotkeyError>;

    fn stop_listening(&mut self);
}

/// A callback that posts `event` on `tx` and then calls `notify` (the app
/// passes a repaint request so the UI wakes up to drain the channel).
///
/// A full channel drops the event; the user pressed the hotkey faster than
/// the UI could react.
pub fn forwarding_callback<N>(
    tx: mpsc::Sender<HotkeyEvent>,
    event: HotkeyEvent,
    notify: N,
) -> HotkeyCallback
where
    N: Fn() + Send + Sync + 'static,
{
    Arc::new(move || {
        match tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("hotkey: event queue full, dropping {event:?}");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("hotkey: receiver gone, dropping {event:?}");
                return;
            }
        }
        notify();
    })
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

const LETTERS: [rdev::Key; 26] = [
    rdev::Key::KeyA,
    rdev::Key::KeyB,
    rdev::Key::KeyC,
    rdev::Key::KeyD,
    rdev::Key::KeyE,
    rdev::Key::KeyF,
    rdev::Key::KeyG,
    rdev::Key::KeyH,
    rdev::Key::KeyI,
    rdev::Key::KeyJ,
    rdev::Key::KeyK,
    rdev::Key::KeyL,
    rdev::Key::KeyM,
    rdev::Key::KeyN,
    rdev::Key::KeyO,
    rdev::Key::KeyP,
    rdev::Key::KeyQ,
    rdev::Key::KeyR,
    rdev::Key::KeyS,
    rdev::Key::KeyT,
    rdev::Key::KeyU,
    rdev::Key::KeyV,
    rdev::Key::KeyW,
    rdev::Key::KeyX,
    rdev::Key::KeyY,
    rdev::Key::KeyZ,
];

const DIGITS: [rdev::Key; 10] = [
    rdev::Key::Num0,
    rdev::Key::Num1,
    rdev::Key::Num2,
    rdev::Key::Num3,
    rdev::Key::Num4,
    rdev::Key::Num5,
    rdev::Key::Num6,
    rdev::Key::Num7,
    rdev::Key::Num8,
    rdev::Key::Num9,
];

/// Parse a single (non-modifier) key name into an [`rdev::Key`].
///
/// Case-insensitive.  Supports F1–F12, common named keys, ASCII letters and
/// digits.
///
/// ```
/// use polar_translate::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"),     Some(rdev::Key::F9));
/// assert_eq!(parse_key("escape"), Some(rdev::Key::Escape));
/// assert_eq!(parse_key("T"),      Some(rdev::Key::KeyT));
/// assert_eq!(parse_key("7"),      Some(rdev::Key::Num7));
/// assert_eq!(parse_key("xyz"),    None);
/// ```
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key;

    let name = name.trim().to_ascii_lowercase();
    let key = match name.as_str() {
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,
        "return" | "enter" => Key::Return,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" | "uparrow" => Key::UpArrow,
        "down" | "downarrow" => Key::DownArrow,
        "left" | "leftarrow" => Key::LeftArrow,
        "right" | "rightarrow" => Key::RightArrow,
        "printscreen" => Key::PrintScreen,
        "pause" => Key::Pause,

        _ => {
            let mut chars = name.chars();
            return match (chars.next(), chars.next()) {
                (Some(c @ 'a'..='z'), None) => Some(LETTERS[(c as u8 - b'a') as usize]),
                (Some(c @ '0'..='9'), None) => Some(DIGITS[(c as u8 - b'0') as usize]),
                _ => None,
            };
        }
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
