//! Types for the acquisition orchestrator.

use serde::Serialize;
use thiserror::Error;

use crate::captcha::CaptchaError;
use crate::cipher::CipherError;
use crate::portal::PortalError;
use crate::schedule::{ParseError, SessionType};

/// Errors that end an acquisition attempt.
///
/// A misread captcha is not among them; the login loop absorbs it.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The login page handshake failed.
    #[error("handshake failed: {0}")]
    Handshake(#[source] PortalError),

    /// Login rejected for a reason other than a wrong captcha.
    #[error("login rejected: {message}")]
    Authentication { message: String },

    /// The captcha safety ceiling was reached.
    #[error("captcha still wrong after {attempts} attempts")]
    CaptchaExhausted { attempts: u32 },

    /// The wanted date is not bookable (polling mode).
    #[error("date {date} is not available yet")]
    DateUnavailable { date: String },

    /// No date is bookable at all.
    #[error("no bookable dates")]
    NoAvailability,

    /// The schedule page could not be read.
    #[error("schedule page parse error: {0}")]
    Parse(#[from] ParseError),

    /// Portal request failed after login.
    #[error("portal error: {0}")]
    Portal(#[from] PortalError),

    /// Captcha recognition failed outright.
    #[error("captcha error: {0}")]
    Captcha(#[from] CaptchaError),

    /// Credentials could not be encrypted.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),
}

impl AcquireError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handshake(_) => "handshake",
            Self::Authentication { .. } => "authentication",
            Self::CaptchaExhausted { .. } => "captcha_exhausted",
            Self::DateUnavailable { .. } => "date_unavailable",
            Self::NoAvailability => "no_availability",
            Self::Parse(_) => "parse",
            Self::Portal(e) if e.is_network() => "network",
            Self::Portal(_) => "portal",
            Self::Captcha(_) => "captcha",
            Self::Cipher(_) => "cipher",
        }
    }
}

/// Confirmation links for one session block of the chosen date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionLinks {
    pub session_type: SessionType,
    /// Links for bookable slots, in slot order. May be empty.
    pub links: Vec<String>,
}

/// Result of a successful acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionReport {
    /// The date that was picked.
    pub date: String,
    /// One entry per session block, in discovery order.
    pub sessions: Vec<SessionLinks>,
}

impl AcquisitionReport {
    /// All links across sessions, in output order.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.sessions
            .iter()
            .flat_map(|s| s.links.iter().map(String::as_str))
    }

    pub fn link_count(&self) -> usize {
        self.sessions.iter().map(|s| s.links.len()).sum()
    }
}

/// Run-wide retry bookkeeping. Never reset by the polling loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetryState {
    /// Acquisition attempts started so far.
    pub attempts: u32,
    /// Re-attempts consumed from the `max_retry` budget.
    pub retries_used: u32,
    /// Set once an attempt succeeds.
    pub succeeded: bool,
}

/// Final result of [`AcquisitionOrchestrator::run`](super::AcquisitionOrchestrator::run).
#[derive(Debug)]
pub struct RunOutcome {
    pub result: Result<AcquisitionReport, AcquireError>,
    pub retry: RetryState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AcquireError::DateUnavailable {
            date: "2024-05-01".to_string(),
        };
        assert_eq!(err.to_string(), "date 2024-05-01 is not available yet");

        let err = AcquireError::Authentication {
            message: "账号不存在".to_string(),
        };
        assert_eq!(err.to_string(), "login rejected: 账号不存在");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(AcquireError::NoAvailability.kind(), "no_availability");
        assert_eq!(AcquireError::Portal(PortalError::Timeout).kind(), "network");
        assert_eq!(
            AcquireError::Portal(PortalError::Decode("x".to_string())).kind(),
            "portal"
        );
        assert_eq!(
            AcquireError::Handshake(PortalError::NoSessionCookie).kind(),
            "handshake"
        );
    }

    #[test]
    fn test_report_links_in_order() {
        let report = AcquisitionReport {
            date: "2024-05-01".to_string(),
            sessions: vec![
                SessionLinks {
                    session_type: SessionType::Am,
                    links: vec!["a1".to_string(), "a2".to_string()],
                },
                SessionLinks {
                    session_type: SessionType::Pm,
                    links: vec!["p1".to_string()],
                },
            ],
        };
        assert_eq!(report.links().collect::<Vec<_>>(), vec!["a1", "a2", "p1"]);
        assert_eq!(report.link_count(), 3);
    }

    #[test]
    fn test_retry_state_default() {
        let state = RetryState::default();
        assert_eq!(state.attempts, 0);
        assert_eq!(state.retries_used, 0);
        assert!(!state.succeeded);
    }
}
