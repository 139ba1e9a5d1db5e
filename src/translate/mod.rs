//! Translation module.
//!
//! * [`Language`], [`TranslationRequest`], [`TranslationResult`]: value types.
//! * [`Translator`]: trait implemented by translation backends.
//! * [`LibreTranslator`]: LibreTranslate / Argos Translate HTTP backend.
//! * [`TranslatorService`]: text, OCR and clipboard translation operations
//!   run inside dispatcher tasks.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use polar_translate::config::AppConfig;
//! use polar_translate::ocr::TesseractOcr;
//! use polar_translate::translate::{LibreTranslator, TranslatorService};
//!
//! let config = AppConfig::default();
//! let service = TranslatorService::new(
//!     Arc::new(LibreTranslator::from_config(&config.translation)),
//!     Arc::new(TesseractOcr::from_config(&config.ocr)),
//! );
//!
//! let result = service.perform_translation("hello", "en", "es");
//! println!("{result:?}");
//! ```

pub mod engine;
pub mod libre;
pub mod model;
pub mod service;

pub use engine::{TranslateError, Translator};
pub use libre::LibreTranslator;
pub use model::{Language, MalformedResult, TranslationRequest, TranslationResult};
pub use service::TranslatorService;

#[cfg(test)]
pub use engine::MockTranslator;
