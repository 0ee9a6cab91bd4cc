//! Types for the reservation portal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::{DateScheduleInfo, TimeScheduleInfo};

use super::Session;

/// Login message the platform returns on success.
pub const LOGIN_SUCCESS_MESSAGE: &str = "success";

/// Login message the platform returns when the captcha text was wrong.
pub const WRONG_CAPTCHA_MESSAGE: &str = "验证码输入不正确！";

/// Login request fields, already encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub verify_code: String,
}

/// Raw login response from the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(rename = "flagState", default)]
    pub flag_state: i64,
    #[serde(default)]
    pub message: String,
}

/// How a login response should be treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginVerdict {
    Success,
    /// The captcha was misread; only the captcha step needs repeating.
    WrongCaptcha,
    Rejected(String),
}

impl LoginResponse {
    pub fn verdict(&self) -> LoginVerdict {
        match self.message.as_str() {
            LOGIN_SUCCESS_MESSAGE => LoginVerdict::Success,
            WRONG_CAPTCHA_MESSAGE => LoginVerdict::WrongCaptcha,
            other => LoginVerdict::Rejected(other.to_string()),
        }
    }
}

/// Errors that can occur while talking to the portal.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Portal connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Portal request failed: {0}")]
    Request(String),

    #[error("Portal request timed out")]
    Timeout,

    #[error("Portal returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode portal response: {0}")]
    Decode(String),

    #[error("Handshake returned no session cookie")]
    NoSessionCookie,

    #[error("Session cookie cannot be sent as a header")]
    InvalidCookie,

    #[error("HTTP client initialization failed: {0}")]
    ClientInit(String),
}

impl PortalError {
    /// Whether the failure came from the network rather than the platform.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Timeout)
    }
}

/// Trait for reservation platform backends.
///
/// Every call after [`handshake`](ReservationPortal::handshake) carries the
/// session it returned.
#[async_trait]
pub trait ReservationPortal: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Open a fresh session by loading the login page.
    async fn handshake(&self) -> Result<Session, PortalError>;

    /// Fetch a captcha image bound to the session.
    async fn captcha_image(&self, session: &Session) -> Result<Vec<u8>, PortalError>;

    /// Submit the login form.
    async fn login(&self, session: &Session, form: &LoginForm)
        -> Result<LoginResponse, PortalError>;

    /// Fetch the raw schedule page for a provider/doctor pair.
    async fn schedule_page(
        &self,
        session: &Session,
        hoscode: &str,
        docid: &str,
    ) -> Result<String, PortalError>;

    /// Fetch the time slots of one bookable block.
    async fn time_slots(
        &self,
        session: &Session,
        info: &DateScheduleInfo,
    ) -> Result<Vec<TimeScheduleInfo>, PortalError>;
}
