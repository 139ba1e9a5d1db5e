//! Translator trait and its error type.
//!
//! [`Translator`] is the seam between the application and a concrete
//! machine-translation backend.  It is object-safe and `Send + Sync` so it
//! can sit behind an `Arc<dyn Translator>` and be called from task worker
//! threads.
//!
//! [`MockTranslator`] (available under `#[cfg(test)]`) answers from a fixed
//! language list and a closure, so services can be tested without a server.

use thiserror::Error;

use crate::translate::model::{Language, TranslationRequest, TranslationResult};

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors raised while talking to a translation backend.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The HTTP request could not be sent or the connection failed.
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a body we could not understand.
    #[error("could not parse translation service response: {0}")]
    Parse(String),

    /// The backend answered with an explicit error.
    #[error("translation service error: {0}")]
    Service(String),
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for translation backends.
///
/// `translate` never fails with an `Err`: backend problems are reported as
/// [`TranslationResult::Failure`] so they flow to the UI like any other
/// outcome.
pub trait Translator: Send + Sync {
    /// Languages the backend can currently translate between.
    fn available_languages(&self) -> Result<Vec<Language>, TranslateError>;

    /// Translate `request.text` from `request.source` to `request.target`.
    fn translate(&self, request: &TranslationRequest) -> TranslationResult;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Translator>) {}
};

// ---------------------------------------------------------------------------
// MockTranslator
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockTranslator;
