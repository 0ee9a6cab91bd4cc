//! Mock reservation portal for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::portal::{LoginForm, LoginResponse, PortalError, ReservationPortal, Session};
use crate::schedule::{DateScheduleInfo, TimeScheduleInfo};

/// Cookie name handed out by [`MockPortal::handshake`].
pub const MOCK_SESSION_COOKIE: &str = "JSESSIONID";

/// A recorded portal call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalCall {
    Handshake,
    CaptchaImage,
    Login { verify_code: String },
    SchedulePage { hoscode: String, docid: String },
    TimeSlots { schcode: String },
}

/// Mock implementation of the ReservationPortal trait.
///
/// Provides controllable behavior for testing:
/// - Scripted login responses, defaulting to success once the script runs out
/// - A queue of schedule pages where the last page keeps being served
/// - Time slots keyed by schedule code
/// - One-shot failures per endpoint
///
/// Every call after the handshake must carry a session cookie; calls with an
/// empty session fail with HTTP 401.
#[derive(Debug)]
pub struct MockPortal {
    calls: Arc<RwLock<Vec<PortalCall>>>,
    logins: Arc<RwLock<Vec<LoginForm>>>,
    login_responses: Arc<RwLock<VecDeque<LoginResponse>>>,
    schedule_pages: Arc<RwLock<VecDeque<String>>>,
    time_slots: Arc<RwLock<HashMap<String, Vec<TimeScheduleInfo>>>>,
    handshake_error: Arc<RwLock<Option<PortalError>>>,
    schedule_error: Arc<RwLock<Option<PortalError>>>,
    time_slots_error: Arc<RwLock<Option<PortalError>>>,
    session_counter: Arc<RwLock<u32>>,
}

impl Default for MockPortal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPortal {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            logins: Arc::new(RwLock::new(Vec::new())),
            login_responses: Arc::new(RwLock::new(VecDeque::new())),
            schedule_pages: Arc::new(RwLock::new(VecDeque::new())),
            time_slots: Arc::new(RwLock::new(HashMap::new())),
            handshake_error: Arc::new(RwLock::new(None)),
            schedule_error: Arc::new(RwLock::new(None)),
            time_slots_error: Arc::new(RwLock::new(None)),
            session_counter: Arc::new(RwLock::new(0)),
        }
    }

    /// Queue login responses, returned in order.
    pub async fn push_login_responses(&self, responses: Vec<LoginResponse>) {
        self.login_responses.write().await.extend(responses);
    }

    /// Queue a schedule page. The last queued page is served indefinitely.
    pub async fn push_schedule_page(&self, html: String) {
        self.schedule_pages.write().await.push_back(html);
    }

    pub async fn push_schedule_pages(&self, pages: Vec<String>) {
        self.schedule_pages.write().await.extend(pages);
    }

    /// Set the slots returned for a schedule code.
    pub async fn set_time_slots(&self, schcode: &str, slots: Vec<TimeScheduleInfo>) {
        self.time_slots
            .write()
            .await
            .insert(schcode.to_string(), slots);
    }

    pub async fn fail_next_handshake(&self, error: PortalError) {
        *self.handshake_error.write().await = Some(error);
    }

    pub async fn fail_next_schedule_page(&self, error: PortalError) {
        *self.schedule_error.write().await = Some(error);
    }

    pub async fn fail_next_time_slots(&self, error: PortalError) {
        *self.time_slots_error.write().await = Some(error);
    }

    /// All calls made, in order.
    pub async fn calls(&self) -> Vec<PortalCall> {
        self.calls.read().await.clone()
    }

    async fn count(&self, pred: impl Fn(&PortalCall) -> bool) -> usize {
        self.calls.read().await.iter().filter(|c| pred(*c)).count()
    }

    pub async fn handshake_count(&self) -> usize {
        self.count(|c| matches!(c, PortalCall::Handshake)).await
    }

    pub async fn captcha_count(&self) -> usize {
        self.count(|c| matches!(c, PortalCall::CaptchaImage)).await
    }

    pub async fn schedule_page_count(&self) -> usize {
        self.count(|c| matches!(c, PortalCall::SchedulePage { .. }))
            .await
    }

    /// Login forms submitted, in order.
    pub async fn submitted_logins(&self) -> Vec<LoginForm> {
        self.logins.read().await.clone()
    }

    /// Captcha answers submitted with login forms, in order.
    pub async fn submitted_captchas(&self) -> Vec<String> {
        self.logins
            .read()
            .await
            .iter()
            .map(|f| f.verify_code.clone())
            .collect()
    }

    /// Schedule codes queried for time slots, in order.
    pub async fn time_slot_queries(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                PortalCall::TimeSlots { schcode } => Some(schcode.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: PortalCall) {
        self.calls.write().await.push(call);
    }

    fn require_session(session: &Session) -> Result<(), PortalError> {
        if session.is_empty() {
            return Err(PortalError::Status {
                status: 401,
                body: "session expired".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationPortal for MockPortal {
    fn name(&self) -> &str {
        "mock"
    }

    async fn handshake(&self) -> Result<Session, PortalError> {
        self.record(PortalCall::Handshake).await;
        if let Some(error) = self.handshake_error.write().await.take() {
            return Err(error);
        }

        let mut counter = self.session_counter.write().await;
        *counter += 1;
        let value = format!("mock-session-{}", *counter);
        Ok(Session::from_pairs([(MOCK_SESSION_COOKIE, value.as_str())]))
    }

    async fn captcha_image(&self, session: &Session) -> Result<Vec<u8>, PortalError> {
        self.record(PortalCall::CaptchaImage).await;
        Self::require_session(session)?;
        Ok(b"\x89PNG mock captcha".to_vec())
    }

    async fn login(
        &self,
        session: &Session,
        form: &LoginForm,
    ) -> Result<LoginResponse, PortalError> {
        self.record(PortalCall::Login {
            verify_code: form.verify_code.clone(),
        })
        .await;
        Self::require_session(session)?;
        self.logins.write().await.push(form.clone());

        Ok(self
            .login_responses
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| LoginResponse {
                flag_state: 1,
                message: crate::portal::LOGIN_SUCCESS_MESSAGE.to_string(),
            }))
    }

    async fn schedule_page(
        &self,
        session: &Session,
        hoscode: &str,
        docid: &str,
    ) -> Result<String, PortalError> {
        self.record(PortalCall::SchedulePage {
            hoscode: hoscode.to_string(),
            docid: docid.to_string(),
        })
        .await;
        Self::require_session(session)?;
        if let Some(error) = self.schedule_error.write().await.take() {
            return Err(error);
        }

        let mut pages = self.schedule_pages.write().await;
        let page = if pages.len() > 1 {
            pages.pop_front()
        } else {
            pages.front().cloned()
        };
        Ok(page.unwrap_or_default())
    }

    async fn time_slots(
        &self,
        session: &Session,
        info: &DateScheduleInfo,
    ) -> Result<Vec<TimeScheduleInfo>, PortalError> {
        self.record(PortalCall::TimeSlots {
            schcode: info.schcode.clone(),
        })
        .await;
        Self::require_session(session)?;
        if let Some(error) = self.time_slots_error.write().await.take() {
            return Err(error);
        }

        Ok(self
            .time_slots
            .read()
            .await
            .get(&info.schcode)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_schedule_page_is_sticky() {
        let portal = MockPortal::new();
        portal
            .push_schedule_pages(vec!["first".to_string(), "second".to_string()])
            .await;
        let session = portal.handshake().await.unwrap();

        assert_eq!(portal.schedule_page(&session, "h", "d").await.unwrap(), "first");
        assert_eq!(portal.schedule_page(&session, "h", "d").await.unwrap(), "second");
        assert_eq!(portal.schedule_page(&session, "h", "d").await.unwrap(), "second");
        assert_eq!(portal.schedule_page_count().await, 3);
    }

    #[tokio::test]
    async fn test_calls_without_session_are_rejected() {
        let portal = MockPortal::new();
        let err = portal.captcha_image(&Session::default()).await.unwrap_err();
        assert!(matches!(err, PortalError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_each_handshake_issues_new_session() {
        let portal = MockPortal::new();
        let first = portal.handshake().await.unwrap();
        let second = portal.handshake().await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.cookie_names().collect::<Vec<_>>(), vec![MOCK_SESSION_COOKIE]);
    }
}
