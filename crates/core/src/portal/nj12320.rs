//! nj12320.org portal implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use reqwest::{multipart, Client, RequestBuilder, Response};
use tracing::debug;

use crate::schedule::{DateScheduleInfo, TimeScheduleInfo};

use super::{LoginForm, LoginResponse, PortalError, ReservationPortal, Session};

/// HTTP client for the nj12320 reservation platform.
pub struct Nj12320Portal {
    client: Client,
    base_url: String,
}

impl Nj12320Portal {
    /// Create a new portal client rooted at `base_url`
    /// (e.g. `https://www.nj12320.org/njres`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PortalError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path)
    }

    /// Cache-busting timestamp the platform expects on its ajax endpoints.
    fn timestamp() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Attach the session cookie, marked sensitive so it stays out of logs.
    fn with_session(
        request: RequestBuilder,
        session: &Session,
    ) -> Result<RequestBuilder, PortalError> {
        let mut value = HeaderValue::from_str(&session.cookie_header())
            .map_err(|_| PortalError::InvalidCookie)?;
        value.set_sensitive(true);
        Ok(request.header(COOKIE, value))
    }

    async fn send(request: RequestBuilder) -> Result<Response, PortalError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PortalError::Timeout
            } else if e.is_connect() {
                PortalError::ConnectionFailed(e.to_string())
            } else {
                PortalError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(response)
    }

    async fn text(response: Response) -> Result<String, PortalError> {
        response
            .text()
            .await
            .map_err(|e| PortalError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ReservationPortal for Nj12320Portal {
    fn name(&self) -> &str {
        "nj12320"
    }

    async fn handshake(&self) -> Result<Session, PortalError> {
        let url = self.endpoint("index_toLogin.do");
        let response = Self::send(self.client.get(&url)).await?;

        let session = Session::from_set_cookie(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );
        if session.is_empty() {
            return Err(PortalError::NoSessionCookie);
        }

        debug!(cookies = ?session, "Handshake complete");
        Ok(session)
    }

    async fn captcha_image(&self, session: &Session) -> Result<Vec<u8>, PortalError> {
        let url = self.endpoint("authImg.do");
        let request = Self::with_session(self.client.get(&url), session)?;
        let response = Self::send(request).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortalError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn login(
        &self,
        session: &Session,
        form: &LoginForm,
    ) -> Result<LoginResponse, PortalError> {
        let url = self.endpoint("indexJson/login.do");
        let timestamp = Self::timestamp();
        let params = [
            ("timestamp", timestamp.as_str()),
            ("ajax", "true"),
            ("username", form.username.as_str()),
            ("password", form.password.as_str()),
            ("verifyCode", form.verify_code.as_str()),
        ];

        let request = Self::with_session(self.client.post(&url).query(&params), session)?;
        let body = Self::text(Self::send(request).await?).await?;

        serde_json::from_str(&body).map_err(|e| {
            PortalError::Decode(format!(
                "login response: {}: {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }

    async fn schedule_page(
        &self,
        session: &Session,
        hoscode: &str,
        docid: &str,
    ) -> Result<String, PortalError> {
        let url = self.endpoint("reservation/doc_detail.do");
        let params = [("hoscode", hoscode), ("docid", docid)];

        let request = Self::with_session(self.client.get(&url).query(&params), session)?;
        Self::text(Self::send(request).await?).await
    }

    async fn time_slots(
        &self,
        session: &Session,
        info: &DateScheduleInfo,
    ) -> Result<Vec<TimeScheduleInfo>, PortalError> {
        let url = self.endpoint("reservationJson/showScheduleTime.do");
        let timestamp = Self::timestamp();
        let params = [("timestamp", timestamp.as_str()), ("ajax", "true")];

        let form = multipart::Form::new()
            .text("hoscode", info.hoscode.clone())
            .text("schcode", info.schcode.clone())
            .text("type", info.session_type.as_str())
            .text("docid", info.docid.clone());

        let request = Self::with_session(
            self.client.post(&url).query(&params).multipart(form),
            session,
        )?;
        let body = Self::text(Self::send(request).await?).await?;

        // The endpoint answers with JSON in a text/html body.
        serde_json::from_str(&body).map_err(|e| {
            PortalError::Decode(format!(
                "time slots for {}: {}: {}",
                info.schcode,
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}
