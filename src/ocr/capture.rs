//! Clipboard image → temporary PNG file.
//!
//! Saving is split in two so the expensive part stays off the UI thread:
//! [`reserve_png_path`] creates an empty, *kept* file (cheap, UI thread) and
//! [`write_png`] encodes the pixels into it (task worker).  The task that
//! reads the file owns it and removes it in its cleanup step.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::clipboard::ClipboardImage;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The pixel buffer does not match the reported dimensions.
    #[error("clipboard image is {width}x{height} but holds {len} bytes")]
    InvalidImage {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("cannot encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("cannot create temporary file: {0}")]
    TempFile(#[from] std::io::Error),
}

/// Create an empty `polar-translate-*.png` file in `dir` and return its
/// path.  The file is not deleted automatically.
pub fn reserve_png_path(dir: &Path) -> Result<PathBuf, CaptureError> {
    tempfile::Builder::new()
        .prefix("polar-translate-")
        .suffix(".png")
        .tempfile_in(dir)?
        .into_temp_path()
        .keep()
        .map_err(|e| CaptureError::TempFile(e.error))
}

/// Encode `image` as PNG into `path`, overwriting it.
pub fn write_png(image: ClipboardImage, path: &Path) -> Result<(), CaptureError> {
    let ClipboardImage {
        width,
        height,
        rgba,
    } = image;
    let len = rgba.len();
    let invalid = || CaptureError::InvalidImage { width, height, len };

    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    let buffer = image::RgbaImage::from_raw(w, h, rgba).ok_or_else(invalid)?;

    buffer.save_with_format(path, image::ImageFormat::Png)?;
    log::debug!("capture: clipboard image saved to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
