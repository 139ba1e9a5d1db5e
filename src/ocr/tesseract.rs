//! Tesseract OCR via its command-line interface.
//!
//! `tesseract <image> stdout -l <lang>` prints the recognised text on
//! stdout.  The executable is taken from [`OcrConfig::tesseract_cmd`] or
//! looked up on `PATH`.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::config::OcrConfig;
use crate::ocr::{OcrError, OcrService};

const DEFAULT_COMMAND: &str = "tesseract";

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn from_config(config: &OcrConfig) -> Self {
        let command = match config.tesseract_cmd.as_deref() {
            Some(cmd) if !cmd.trim().is_empty() => {
                if !Path::new(cmd).exists() {
                    log::warn!("ocr: configured tesseract path '{cmd}' does not exist");
                }
                cmd.to_string()
            }
            _ => DEFAULT_COMMAND.to_string(),
        };

        Self {
            command,
            language: config.language.clone(),
        }
    }

    /// The engine version string, or `None` if the executable cannot run.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.command).arg("--version").output().ok()?;
        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .map(|l| l.trim().to_string())
    }
}

impl OcrService for TesseractOcr {
    fn extract_text(&self, image_path: &Path) -> Result<String, OcrError> {
        if !image_path.exists() {
            return Err(OcrError::ImageNotFound(image_path.display().to_string()));
        }

        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::EngineNotFound(self.command.clone()),
                _ => OcrError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OcrError::Engine(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
