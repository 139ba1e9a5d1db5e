//! OCR module.
//!
//! * [`OcrService`]: trait implemented by OCR engines.
//! * [`TesseractOcr`]: runs the `tesseract` command-line tool.
//! * [`reserve_png_path`] / [`write_png`]: turn a clipboard image into a
//!   temporary PNG that an [`OcrService`] can read.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use polar_translate::config::OcrConfig;
//! use polar_translate::ocr::{OcrService, TesseractOcr};
//!
//! let ocr = TesseractOcr::from_config(&OcrConfig::default());
//! let text = ocr.extract_text(Path::new("screenshot.png")).unwrap();
//! println!("{text}");
//! ```

pub mod capture;
pub mod tesseract;

use std::path::Path;

use thiserror::Error;

pub use capture::{reserve_png_path, write_png, CaptureError};
pub use tesseract::TesseractOcr;

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OcrError {
    /// The OCR executable could not be started.
    #[error("OCR engine not found: {0}")]
    EngineNotFound(String),

    /// The image to read does not exist.
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// The engine ran but reported a failure.
    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// OcrService trait
// ---------------------------------------------------------------------------

/// Image → text extraction.
///
/// An empty string means "no text found"; engine problems are `Err`.
/// Implementations must be callable from task worker threads.
pub trait OcrService: Send + Sync {
    fn extract_text(&self, image_path: &Path) -> Result<String, OcrError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn OcrService>) {}
};

// ---------------------------------------------------------------------------
// MockOcr
// ---------------------------------------------------------------------------

#[cfg(test)]
pub struct MockOcr {
    outcome: Result<String, String>,
}

#[cfg(test)]
impl MockOcr {
    pub fn text(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
        }
    }

    /// Every call fails with `OcrError::Engine` carrying `error`'s message.
    pub fn failing(error: OcrError) -> Self {
        let message = match error {
            OcrError::Engine(message) => message,
            other => other.to_string(),
        };
        Self {
            outcome: Err(message),
        }
    }
}

#[cfg(test)]
impl OcrService for MockOcr {
    fn extract_text(&self, _image_path: &Path) -> Result<String, OcrError> {
        self.outcome.clone().map_err(OcrError::Engine)
    }
}
