//! Captcha-gated login state machine.

use tracing::{debug, info};

use crate::captcha::{normalize_captcha, CaptchaSolver};
use crate::cipher::CredentialCipher;
use crate::portal::{LoginForm, LoginVerdict, ReservationPortal, Session};

use super::config::Credentials;
use super::types::AcquireError;

/// Login progress. A rejected login leaves the machine with an error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// No session yet; the handshake comes first.
    NeedSession,
    /// Session held, a fresh captcha is needed.
    NeedCaptcha,
    /// Captcha read, login form about to be submitted.
    AwaitLoginResult { captcha: String },
    Authenticated,
}

/// A session the platform has accepted a login on.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session: Session,
    /// Captcha images fetched and recognized for this login.
    pub captcha_rounds: u32,
}

/// Drives [`LoginState`] from handshake to an authenticated session.
///
/// Wrong-captcha answers loop back to [`LoginState::NeedCaptcha`] without
/// touching the retry budget. Only `captcha_limit`, when set, bounds them.
pub struct LoginMachine<'a> {
    portal: &'a dyn ReservationPortal,
    solver: &'a dyn CaptchaSolver,
    cipher: &'a dyn CredentialCipher,
    credentials: &'a Credentials,
    captcha_limit: Option<u32>,
    debug: bool,
}

impl<'a> LoginMachine<'a> {
    pub fn new(
        portal: &'a dyn ReservationPortal,
        solver: &'a dyn CaptchaSolver,
        cipher: &'a dyn CredentialCipher,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            portal,
            solver,
            cipher,
            credentials,
            captcha_limit: None,
            debug: false,
        }
    }

    /// Stop with [`AcquireError::CaptchaExhausted`] after `limit` captcha rounds.
    pub fn with_captcha_limit(mut self, limit: Option<u32>) -> Self {
        self.captcha_limit = limit;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Run the machine to completion.
    pub async fn run(&self) -> Result<AuthenticatedSession, AcquireError> {
        let mut state = LoginState::NeedSession;
        let mut session = Session::default();
        let mut captcha_rounds: u32 = 0;

        // The form fields only depend on the credentials, so encrypt them once.
        let username = self.cipher.encrypt(&self.credentials.username)?;
        let password = self
            .cipher
            .encrypt(&self.cipher.hash(&self.credentials.password))?;
        if self.debug {
            debug!(
                username = %self.credentials.username,
                encrypted_username = %username,
                encrypted_password = %password,
                "Encrypted login fields"
            );
        }

        loop {
            state = match state {
                LoginState::NeedSession => {
                    session = self
                        .portal
                        .handshake()
                        .await
                        .map_err(AcquireError::Handshake)?;
                    LoginState::NeedCaptcha
                }
                LoginState::NeedCaptcha => {
                    if let Some(limit) = self.captcha_limit {
                        if captcha_rounds >= limit {
                            return Err(AcquireError::CaptchaExhausted {
                                attempts: captcha_rounds,
                            });
                        }
                    }
                    captcha_rounds += 1;

                    info!(round = captcha_rounds, "Fetching captcha");
                    let image = self.portal.captcha_image(&session).await?;
                    let raw = self.solver.recognize(&image).await?;
                    let captcha = normalize_captcha(&raw);
                    if self.debug {
                        debug!(captcha = %captcha, solver = self.solver.name(), "Captcha recognized");
                    }
                    LoginState::AwaitLoginResult { captcha }
                }
                LoginState::AwaitLoginResult { captcha } => {
                    info!("Logging in");
                    let form = LoginForm {
                        username: username.clone(),
                        password: password.clone(),
                        verify_code: captcha,
                    };
                    let response = self.portal.login(&session, &form).await?;
                    if self.debug {
                        debug!(
                            flag_state = response.flag_state,
                            message = %response.message,
                            "Login response"
                        );
                    }

                    match response.verdict() {
                        LoginVerdict::Success => LoginState::Authenticated,
                        LoginVerdict::WrongCaptcha => {
                            info!(round = captcha_rounds, "Captcha misread, retrying");
                            LoginState::NeedCaptcha
                        }
                        LoginVerdict::Rejected(message) => {
                            return Err(AcquireError::Authentication { message });
                        }
                    }
                }
                LoginState::Authenticated => {
                    info!(captcha_rounds, "Logged in");
                    return Ok(AuthenticatedSession {
                        session,
                        captcha_rounds,
                    });
                }
            };
        }
    }
}
