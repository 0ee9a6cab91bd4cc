//! Captcha recognition.
//!
//! The `CaptchaSolver` trait turns a captcha image into best-effort text.
//! Answers are never trusted: the login flow expects misreads and simply
//! asks for another image.

mod error;
mod tesseract;
mod traits;

pub use error::CaptchaError;
pub use tesseract::TesseractSolver;
pub use traits::{normalize_captcha, CaptchaSolver};
