//! Polar Translate - clipboard / OCR translation utility.
//!
//! The crate is split into the background task core ([`dispatch`]) and the
//! collaborators it drives:
//!
//! * [`translate`]: language model types, the [`translate::Translator`]
//!   trait, the LibreTranslate backend and the application-level service.
//! * [`ocr`]: the [`ocr::OcrService`] trait, Tesseract backend and
//!   clipboard image capture.
//! * [`hotkey`]: global hotkey registration backed by `rdev`.
//! * [`clipboard`]: system clipboard access backed by `arboard`.
//! * [`config`]: TOML settings and platform paths.
//! * [`app`]: the eframe/egui window that owns the dispatcher.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod hotkey;
pub mod ocr;
pub mod translate;
