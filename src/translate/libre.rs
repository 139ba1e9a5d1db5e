//! LibreTranslate backend, the HTTP server that fronts Argos Translate.
//!
//! Wire format:
//!
//! * `GET  {base_url}/languages` → `[{"code": "en", "name": "English", "targets": [...]}, ...]`
//! * `POST {base_url}/translate` with `{"q", "source", "target", "format", "api_key"?}`
//!   → `{"translatedText": "..."}` on success, `{"error": "..."}` otherwise.
//!
//! Calls are blocking; the translator is only ever used from task worker
//! threads and at startup, never from the UI frame loop.

use serde::Deserialize;

use crate::config::TranslationConfig;
use crate::translate::engine::{TranslateError, Translator};
use crate::translate::model::{Language, TranslationRequest, TranslationResult};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireLanguage {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTranslation {
    translated_text: Option<String>,
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// LibreTranslator
// ---------------------------------------------------------------------------

/// Talks to a LibreTranslate instance (self-hosted or public).
///
/// All connection details come from the [`TranslationConfig`] passed to
/// [`LibreTranslator::from_config`].
pub struct LibreTranslator {
    client: reqwest::blocking::Client,
    config: TranslationConfig,
}

impl LibreTranslator {
    /// Build a translator whose HTTP client times out after
    /// `config.timeout_secs`.
    pub fn from_config(config: &TranslationConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request_body(&self, request: &TranslationRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "q":      request.text,
            "source": request.source.code,
            "target": request.target.code,
            "format": "text",
        });

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            body["api_key"] = serde_json::Value::String(key.to_string());
        }
        body
    }

    fn send_translate(&self, request: &TranslationRequest) -> Result<(u16, String), TranslateError> {
        let response = self
            .client
            .post(self.endpoint("translate"))
            .json(&self.request_body(request))
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok((status, body))
    }
}

impl Translator for LibreTranslator {
    fn available_languages(&self) -> Result<Vec<Language>, TranslateError> {
        let body = self.client.get(self.endpoint("languages")).send()?.text()?;
        let languages = parse_languages(&body)?;
        log::debug!("libretranslate: {} languages available", languages.len());
        Ok(languages)
    }

    fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        log::debug!(
            "libretranslate: translating {} chars {} -> {}",
            request.text.chars().count(),
            request.source.code,
            request.target.code
        );

        match self.send_translate(request) {
            Ok((status, body)) => parse_translation(status, &body),
            Err(e) => {
                log::warn!("libretranslate: {e}");
                TranslationResult::failure(e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_languages(body: &str) -> Result<Vec<Language>, TranslateError> {
    let wire: Vec<WireLanguage> =
        serde_json::from_str(body).map_err(|e| TranslateError::Parse(e.to_string()))?;
    Ok(wire
        .into_iter()
        .map(|l| Language::new(l.code, l.name))
        .collect())
}

fn parse_translation(status: u16, body: &str) -> TranslationResult {
    let wire: WireTranslation = match serde_json::from_str(body) {
        Ok(wire) => wire,
        Err(e) => {
            return TranslationResult::failure(
                TranslateError::Parse(format!("HTTP {status}: {e}")).to_string(),
            )
        }
    };

    match (wire.translated_text, wire.error) {
        (_, Some(error)) => TranslationResult::failure(
            TranslateError::Service(format!("HTTP {status}: {error}")).to_string(),
        ),
        (Some(text), None) if (200..300).contains(&status) => TranslationResult::success(text),
        _ => TranslationResult::failure(
            TranslateError::Service(format!("HTTP {status} without a translation")).to_string(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> TranslationConfig {
        TranslationConfig {
            base_url: "http://localhost:5000/".into(),
            api_key: api_key.map(|s| s.to_string()),
            ..TranslationConfig::default()
        }
    }

    fn request() -> TranslationRequest {
        TranslationRequest::new(
            "hello",
            Language::new("en", "English"),
            Language::new("es", "Spanish"),
        )
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let t = LibreTranslator::from_config(&make_config(None));
        assert_eq!(t.endpoint("translate"), "http://localhost:5000/translate");
    }

    #[test]
    fn request_body_omits_empty_api_key() {
        let t = LibreTranslator::from_config(&make_config(Some("")));
        let body = t.request_body(&request());
        assert_eq!(body["q"], "hello");
        assert_eq!(body["source"], "en");
        assert_eq!(body["target"], "es");
        assert!(body.get("api_key").is_none());
    }

    #[test]
    fn request_body_includes_api_key() {
        let t = LibreTranslator::from_config(&make_config(Some("secret")));
        assert_eq!(t.request_body(&request())["api_key"], "secret");
    }

    #[test]
    fn parses_language_list() {
        let body = r#"[{"code":"en","name":"English","targets":["es"]},
                       {"code":"es","name":"Spanish","targets":["en"]}]"#;
        let langs = parse_languages(body).unwrap();
        assert_eq!(langs.len(), 2);
        assert_eq!(langs[1], Language::new("es", "Spanish"));
        assert_eq!(langs[1].name, "Spanish");
    }

    #[test]
    fn garbage_language_list_is_parse_error() {
        assert!(matches!(
            parse_languages("<html>"),
            Err(TranslateError::Parse(_))
        ));
    }

    #[test]
    fn successful_translation() {
        let r = parse_translation(200, r#"{"translatedText":"hola"}"#);
        assert_eq!(r, TranslationResult::success("hola"));
    }

    #[test]
    fn service_error_becomes_failure() {
        let r = parse_translation(400, r#"{"error":"es is not supported"}"#);
        let msg = r.error().unwrap();
        assert!(msg.contains("400"));
        assert!(msg.contains("es is not supported"));
    }

    #[test]
    fn non_json_body_becomes_failure() {
        let r = parse_translation(502, "Bad Gateway");
        assert!(!r.is_successful());
        assert!(r.error().unwrap().contains("502"));
    }

    #[test]
    fn non_success_status_without_error_is_failure() {
        let r = parse_translation(500, r#"{"translatedText":"hola"}"#);
        assert!(!r.is_successful());
    }

    #[test]
    fn translator_is_object_safe() {
        let t: Box<dyn Translator> = Box::new(LibreTranslator::from_config(&make_config(None)));
        drop(t);
    }
}
