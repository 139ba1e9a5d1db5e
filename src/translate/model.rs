//! Value types shared by every translation path.

use std::hash::{Hash, Hasher};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// A language supported by the translation backend.
///
/// Identity is the ISO code alone: two `Language`s with the same `code` are
/// interchangeable regardless of their display `name`.
///
/// ```
/// use polar_translate::translate::Language;
///
/// assert_eq!(Language::new("es", "Spanish"), Language::new("es", "Español"));
/// ```
#[derive(Debug, Clone)]
pub struct Language {
    /// ISO-639-1 code, e.g. `"en"`.
    pub code: String,
    /// Human-readable name, e.g. `"English"`.
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Language {}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

// ---------------------------------------------------------------------------
// TranslationRequest
// ---------------------------------------------------------------------------

/// One translation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: Language, target: Language) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationResult
// ---------------------------------------------------------------------------

/// Terminal outcome of a translation, OCR or clipboard task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResult {
    /// The text was translated.
    Success { translated_text: String },
    /// The attempt failed; `error` is shown to the user instead of a result.
    Failure { error: String },
}

/// A [`TranslationResult`] that cannot be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResult {
    #[error("work returned a failure without an error description")]
    MissingErrorDescription,
}

impl TranslationResult {
    pub fn success(translated_text: impl Into<String>) -> Self {
        Self::Success {
            translated_text: translated_text.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// `true` iff a translated text is present and no error is.
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn translated_text(&self) -> Option<&str> {
        match self {
            Self::Success { translated_text } => Some(translated_text),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Check that the result can be delivered as-is.
    ///
    /// A `Failure` must carry a non-blank description; an empty successful
    /// translation is valid (translating an empty string yields one).
    pub fn validate(&self) -> Result<(), MalformedResult> {
        match self {
            Self::Failure { error } if error.trim().is_empty() => {
                Err(MalformedResult::MissingErrorDescription)
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
