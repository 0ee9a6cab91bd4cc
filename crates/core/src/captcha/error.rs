//! Error types for the captcha module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during captcha recognition.
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// Tesseract binary not found.
    #[error("Tesseract not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// The portal returned an empty image.
    #[error("Captcha image is empty")]
    EmptyImage,

    /// Recognition process failed.
    #[error("Captcha recognition failed: {reason}")]
    RecognitionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Recognition timed out.
    #[error("Captcha recognition timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while talking to the recognizer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptchaError {
    /// Creates a new recognition failed error with stderr output.
    pub fn recognition_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::RecognitionFailed {
            reason: reason.into(),
            stderr,
        }
    }
}
