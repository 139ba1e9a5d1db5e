//! Application settings structs, defaults and TOML persistence.
//!
//! Every section is `#[serde(default)]`, so a `settings.toml` that only sets
//! a few keys still loads; missing keys take their default value.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TranslationConfig
// ---------------------------------------------------------------------------

/// Connection to the LibreTranslate (Argos Translate) server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Base URL of the server, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// API key; `None` for a local server without authentication.
    pub api_key: Option<String>,
    /// Seconds to wait for one HTTP request.
    pub timeout_secs: u64,
    /// Source language code selected at startup.
    pub default_source: String,
    /// Target language code selected at startup.
    pub default_target: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            api_key: None,
            timeout_secs: 30,
            default_source: "en".into(),
            default_target: "es".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path to the `tesseract` executable; `None` looks it up on `PATH`.
    pub tesseract_cmd: Option<String>,
    /// Tesseract language pack(s), e.g. `"eng"` or `"eng+spa"`.
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: None,
            language: "eng".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Register global hotkeys at startup.
    pub enabled: bool,
    /// Chord that translates the clipboard text, e.g. `"ctrl+alt+t"`.
    pub clipboard_translation: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clipboard_translation: "ctrl+alt+t".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub always_on_top: bool,
    /// Initial window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
    /// Show hotkey translations in a pop-up window.
    pub popup_on_hotkey: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            always_on_top: false,
            window_size: (720.0, 520.0),
            popup_on_hotkey: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TaskConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// How long window close waits for a running task before abandoning it.
    pub shutdown_timeout_secs: u64,
}

impl TaskConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use polar_translate::config::AppConfig;
///
/// // Returns Default when the file is missing.
/// let mut config = AppConfig::load().unwrap();
/// config.translation.default_target = "fr".into();
/// config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub translation: TranslationConfig,
    pub ocr: OcrConfig,
    pub hotkey: HotkeyConfig,
    pub ui: UiConfig,
    pub tasks: TaskConfig,
}

impl AppConfig {
    /// Load from the platform `settings.toml`; `Default` if it does not
    /// exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("invalid {}", path.display()))?;
        Ok(config)
    }

    /// Save to the platform `settings.toml`, creating parent directories.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
