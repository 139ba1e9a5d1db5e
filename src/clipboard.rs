//! System clipboard access backed by the `arboard` crate.
//!
//! [`SystemClipboard`] opens a short-lived [`arboard::Clipboard`] handle for
//! every call rather than holding one, because `arboard::Clipboard` is not
//! `Send` on all platforms and the handle is cheap to create.  That keeps
//! [`SystemClipboard`] usable from task worker threads.

use arboard::Clipboard as ArboardClipboard;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ClipboardError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Could not open the system clipboard.
    #[error("cannot access clipboard: {0}")]
    Access(String),

    /// Could not read from the clipboard.
    #[error("cannot read clipboard: {0}")]
    Read(String),

    /// Could not write to the clipboard.
    #[error("cannot set clipboard text: {0}")]
    Write(String),
}

// ---------------------------------------------------------------------------
// ClipboardImage
// ---------------------------------------------------------------------------

/// Raw RGBA8 pixels copied off the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardImage {
    pub width: usize,
    pub height: usize,
    /// `width * height * 4` bytes, row-major.
    pub rgba: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Clipboard trait
// ---------------------------------------------------------------------------

/// Clipboard accessor used by the app and by clipboard translation tasks.
pub trait Clipboard: Send + Sync {
    /// Current plain-text content; an empty string when the clipboard holds
    /// no text.
    fn get_text(&self) -> Result<String, ClipboardError>;

    /// Replace the clipboard content with `text`.
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Current image content, or `None` when the clipboard holds no image.
    fn get_image(&self) -> Result<Option<ClipboardImage>, ClipboardError>;
}

// ---------------------------------------------------------------------------
// SystemClipboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    fn open() -> Result<ArboardClipboard, ClipboardError> {
        ArboardClipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&self) -> Result<String, ClipboardError> {
        match Self::open()?.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Read(e.to_string())),
        }
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        Self::open()?
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }

    fn get_image(&self) -> Result<Option<ClipboardImage>, ClipboardError> {
        match Self::open()?.get_image() {
            Ok(image) => Ok(Some(ClipboardImage {
                width: image.width,
                height: image.height,
                rgba: image.bytes.into_owned(),
            })),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipboardError::Read(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockClipboard
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockClipboard;
