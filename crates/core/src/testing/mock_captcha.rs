//! Mock captcha solver for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::captcha::{CaptchaError, CaptchaSolver};

/// Answer returned once the scripted answers run out.
const DEFAULT_ANSWER: &str = "ABCD";

/// Mock implementation of the CaptchaSolver trait.
///
/// Returns scripted answers in order, then [`DEFAULT_ANSWER`]. Answers are
/// returned raw, so whitespace handling by the caller can be checked.
#[derive(Debug)]
pub struct MockCaptchaSolver {
    answers: Arc<RwLock<VecDeque<String>>>,
    images: Arc<RwLock<Vec<Vec<u8>>>>,
    /// If set, the next recognition will fail with this error.
    next_error: Arc<RwLock<Option<CaptchaError>>>,
}

impl Default for MockCaptchaSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCaptchaSolver {
    pub fn new() -> Self {
        Self {
            answers: Arc::new(RwLock::new(VecDeque::new())),
            images: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a solver that returns `answers` in order.
    pub fn with_answers(answers: Vec<&str>) -> Self {
        Self {
            answers: Arc::new(RwLock::new(
                answers.into_iter().map(String::from).collect(),
            )),
            ..Self::new()
        }
    }

    pub async fn push_answer(&self, answer: &str) {
        self.answers.write().await.push_back(answer.to_string());
    }

    /// Make the next recognition fail.
    pub async fn fail_next(&self, error: CaptchaError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of images handed to the solver.
    pub async fn recognize_count(&self) -> usize {
        self.images.read().await.len()
    }

    pub async fn images(&self) -> Vec<Vec<u8>> {
        self.images.read().await.clone()
    }
}

#[async_trait]
impl CaptchaSolver for MockCaptchaSolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, CaptchaError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.images.write().await.push(image.to_vec());

        Ok(self
            .answers
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| DEFAULT_ANSWER.to_string()))
    }
}
