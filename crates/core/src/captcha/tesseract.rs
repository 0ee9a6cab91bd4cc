//! Tesseract-based captcha solver.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::config::TesseractConfig;

use super::error::CaptchaError;
use super::traits::CaptchaSolver;

/// Upper bound on a single recognition run.
const RECOGNITION_TIMEOUT_SECS: u64 = 30;

/// Solver that pipes the image through the `tesseract` command line tool.
pub struct TesseractSolver {
    config: TesseractConfig,
}

impl TesseractSolver {
    /// Creates a new Tesseract solver with the given configuration.
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Creates a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TesseractConfig::default())
    }

    /// Builds tesseract arguments: read the image from stdin, write text to stdout.
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.lang.clone(),
        ];
        if let Some(psm) = self.config.psm {
            args.extend(["--psm".to_string(), psm.to_string()]);
        }
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> CaptchaError {
        if e.kind() == std::io::ErrorKind::NotFound {
            CaptchaError::BinaryNotFound {
                path: self.config.path.clone(),
            }
        } else {
            CaptchaError::Io(e)
        }
    }
}

#[async_trait]
impl CaptchaSolver for TesseractSolver {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, CaptchaError> {
        if image.is_empty() {
            return Err(CaptchaError::EmptyImage);
        }

        let mut child = Command::new(&self.config.path)
            .args(self.build_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CaptchaError::recognition_failed("stdin was not captured", None))?;
        stdin.write_all(image).await?;
        drop(stdin);

        let output = timeout(
            Duration::from_secs(RECOGNITION_TIMEOUT_SECS),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| CaptchaError::Timeout {
            timeout_secs: RECOGNITION_TIMEOUT_SECS,
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(CaptchaError::recognition_failed(
                format!("tesseract exited with {}", output.status),
                Some(stderr),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(raw = %text.trim(), "Tesseract output");
        Ok(text)
    }

    async fn validate(&self) -> Result<(), CaptchaError> {
        info!(path = %self.config.path.display(), "Loading OCR engine");
        let output = Command::new(&self.config.path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(CaptchaError::recognition_failed(
                "tesseract --version failed",
                Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            ));
        }

        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        let version = String::from_utf8_lossy(banner);
        info!(
            version = %version.lines().next().unwrap_or_default(),
            lang = %self.config.lang,
            "OCR engine ready"
        );
        Ok(())
    }
}
