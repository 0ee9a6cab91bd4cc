//! Trait definitions for the captcha module.

use async_trait::async_trait;

use super::error::CaptchaError;

/// Converts a captcha image into text.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Returns the name of this solver implementation.
    fn name(&self) -> &str;

    /// Recognizes the text in a captcha image. No accuracy is promised.
    async fn recognize(&self, image: &[u8]) -> Result<String, CaptchaError>;

    /// Checks that the solver is ready to use.
    async fn validate(&self) -> Result<(), CaptchaError> {
        Ok(())
    }
}

/// Strip whitespace and line breaks that OCR engines add around the answer.
pub fn normalize_captcha(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
