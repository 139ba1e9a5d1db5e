//! Application-level translation operations.
//!
//! [`TranslatorService`] turns user intents (translate this text, translate
//! the text in this image, translate the clipboard) into a single
//! [`TranslationResult`].  Every method is synchronous and is meant to run
//! inside a dispatcher task, never on the UI thread.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::clipboard::Clipboard;
use crate::ocr::OcrService;
use crate::translate::engine::Translator;
use crate::translate::model::{Language, TranslationRequest, TranslationResult};

/// Wires a [`Translator`] and an [`OcrService`] together.
pub struct TranslatorService {
    translator: Arc<dyn Translator>,
    ocr: Arc<dyn OcrService>,
    /// Languages fetched from the translator; `None` until the first
    /// successful fetch.
    languages: Mutex<Option<Vec<Language>>>,
}

impl TranslatorService {
    pub fn new(translator: Arc<dyn Translator>, ocr: Arc<dyn OcrService>) -> Self {
        Self {
            translator,
            ocr,
            languages: Mutex::new(None),
        }
    }

    /// Supported languages, fetched once and cached.
    ///
    /// Returns an empty list when the backend cannot be reached; the next
    /// call retries.
    pub fn supported_languages(&self) -> Vec<Language> {
        if let Some(cached) = self.cached_languages() {
            return cached;
        }
        self.reload_languages()
    }

    /// Re-fetch the language list from the backend, replacing the cache.
    pub fn reload_languages(&self) -> Vec<Language> {
        match self.translator.available_languages() {
            Ok(languages) => {
                log::info!("translator: {} languages available", languages.len());
                *self.lock_languages() = Some(languages.clone());
                languages
            }
            Err(e) => {
                log::error!("translator: could not load languages: {e}");
                Vec::new()
            }
        }
    }

    /// Translate `text` between two language codes.
    pub fn perform_translation(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> TranslationResult {
        let languages = self.supported_languages();
        let find = |code: &str| languages.iter().find(|l| l.code == code).cloned();

        let Some(source) = find(source_code) else {
            return TranslationResult::failure(format!("Unsupported source language: {source_code}"));
        };
        let Some(target) = find(target_code) else {
            return TranslationResult::failure(format!("Unsupported target language: {target_code}"));
        };

        let request = TranslationRequest::new(text, source, target);
        self.translator.translate(&request)
    }

    /// Extract text from the image at `image_path`, then translate it.
    pub fn perform_ocr_and_translate(
        &self,
        image_path: &Path,
        source_code: &str,
        target_code: &str,
    ) -> TranslationResult {
        let extracted = match self.ocr.extract_text(image_path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("ocr: extraction failed for {}: {e}", image_path.display());
                return TranslationResult::failure(format!("OCR text extraction failed: {e}"));
            }
        };

        let extracted = extracted.trim();
        if extracted.is_empty() {
            return TranslationResult::failure("No text could be extracted from the image.");
        }

        log::debug!("ocr: extracted {} chars", extracted.chars().count());
        self.perform_translation(extracted, source_code, target_code)
    }

    /// Translate whatever text is currently on the clipboard.
    pub fn translate_clipboard(
        &self,
        clipboard: &dyn Clipboard,
        source_code: &str,
        target_code: &str,
    ) -> TranslationResult {
        let text = match clipboard.get_text() {
            Ok(text) => text,
            Err(e) => return TranslationResult::failure(format!("Could not read the clipboard: {e}")),
        };

        if text.trim().is_empty() {
            return TranslationResult::failure("The clipboard is empty or holds no text.");
        }

        self.perform_translation(&text, source_code, target_code)
    }

    /// The cached language list, without touching the backend.
    pub fn cached_languages(&self) -> Option<Vec<Language>> {
        self.lock_languages().clone()
    }

    fn lock_languages(&self) -> std::sync::MutexGuard<'_, Option<Vec<Language>>> {
        self.languages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::clipboard::MockClipboard;
    use crate::ocr::{MockOcr, OcrError};
    use crate::translate::engine::MockTranslator;

    fn service(translator: MockTranslator, ocr: MockOcr) -> (TranslatorService, Arc<MockTranslator>) {
        let translator = Arc::new(translator);
        let svc = TranslatorService::new(translator.clone(), Arc::new(ocr));
        (svc, translator)
    }

    fn image() -> PathBuf {
        PathBuf::from("capture.png")
    }

    #[test]
    fn translates_between_supported_codes() {
        let (svc, _) = service(MockTranslator::replying("hola"), MockOcr::text(""));
        assert_eq!(
            svc.perform_translation("hello", "en", "es"),
            TranslationResult::success("hola")
        );
    }

    #[test]
    fn request_carries_resolved_languages() {
        let translator = MockTranslator::with(
            vec![Language::new("en", "English"), Language::new("fr", "French")],
            |req| TranslationResult::success(format!("{}>{}:{}", req.source.name, req.target.name, req.text)),
        );
        let (svc, _) = service(translator, MockOcr::text(""));
        assert_eq!(
            svc.perform_translation("hi", "en", "fr").translated_text(),
            Some("English>French:hi")
        );
    }

    #[test]
    fn unsupported_source_is_failure_without_calling_backend() {
        let (svc, translator) = service(MockTranslator::replying("x"), MockOcr::text(""));
        let r = svc.perform_translation("hello", "xx", "es");
        assert_eq!(r.error(), Some("Unsupported source language: xx"));
        assert_eq!(translator.call_count(), 0);
    }

    #[test]
    fn unsupported_target_is_failure() {
        let (svc, _) = service(MockTranslator::replying("x"), MockOcr::text(""));
        let r = svc.perform_translation("hello", "en", "zz");
        assert_eq!(r.error(), Some("Unsupported target language: zz"));
    }

    #[test]
    fn unreachable_backend_yields_no_languages() {
        let (svc, _) = service(MockTranslator::unreachable(), MockOcr::text(""));
        assert!(svc.supported_languages().is_empty());
        assert!(!svc.perform_translation("a", "en", "es").is_successful());
    }

    #[test]
    fn reload_replaces_cached_languages() {
        let (svc, translator) = service(MockTranslator::unreachable(), MockOcr::text(""));
        assert!(svc.supported_languages().is_empty());
        assert!(svc.cached_languages().is_none());

        translator.set_languages(Some(vec![Language::new("de", "German")]));
        assert_eq!(svc.reload_languages(), vec![Language::new("de", "German")]);
        assert_eq!(svc.cached_languages(), Some(vec![Language::new("de", "German")]));

        // A failed reload keeps the previous list.
        translator.set_languages(None);
        assert!(svc.reload_languages().is_empty());
        assert_eq!(svc.supported_languages(), vec![Language::new("de", "German")]);
    }

    #[test]
    fn ocr_text_is_translated() {
        let translator = MockTranslator::with(
            vec![Language::new("en", "English"), Language::new("es", "Spanish")],
            |req| TranslationResult::success(req.text.to_uppercase()),
        );
        let (svc, _) = service(translator, MockOcr::text("  stop sign \n"));
        assert_eq!(
            svc.perform_ocr_and_translate(&image(), "en", "es"),
            TranslationResult::success("STOP SIGN")
        );
    }

    #[test]
    fn ocr_without_text_is_failure() {
        let (svc, translator) = service(MockTranslator::replying("x"), MockOcr::text(" \n "));
        let r = svc.perform_ocr_and_translate(&image(), "en", "es");
        assert_eq!(r.error(), Some("No text could be extracted from the image."));
        assert_eq!(translator.call_count(), 0);
    }

    #[test]
    fn ocr_error_is_failure() {
        let (svc, _) = service(
            MockTranslator::replying("x"),
            MockOcr::failing(OcrError::Engine("bad image".into())),
        );
        let r = svc.perform_ocr_and_translate(&image(), "en", "es");
        assert!(r.error().unwrap().starts_with("OCR text extraction failed"));
        assert!(r.error().unwrap().contains("bad image"));
    }

    #[test]
    fn clipboard_text_is_translated() {
        let (svc, _) = service(MockTranslator::replying("hola"), MockOcr::text(""));
        let clipboard = MockClipboard::with_text("hello");
        assert_eq!(
            svc.translate_clipboard(&clipboard, "en", "es"),
            TranslationResult::success("hola")
        );
    }

    #[test]
    fn empty_clipboard_is_failure() {
        let (svc, translator) = service(MockTranslator::replying("hola"), MockOcr::text(""));
        let clipboard = MockClipboard::with_text("   ");
        assert!(!svc.translate_clipboard(&clipboard, "en", "es").is_successful());
        assert_eq!(translator.call_count(), 0);
    }
}
