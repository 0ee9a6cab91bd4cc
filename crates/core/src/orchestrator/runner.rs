//! Acquisition orchestrator implementation.
//!
//! One attempt is login → schedule page → date selection → time-slot queries
//! → links. Failed attempts are re-run immediately while the run-wide budget
//! lasts; in polling mode the whole thing repeats every `interval_ms` until
//! an attempt succeeds.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::captcha::CaptchaSolver;
use crate::cipher::CredentialCipher;
use crate::portal::ReservationPortal;
use crate::schedule::{bookable_links, parse_schedule_page};

use super::config::OrchestratorConfig;
use super::login::LoginMachine;
use super::selection::select_date;
use super::types::{AcquireError, AcquisitionReport, RetryState, RunOutcome, SessionLinks};

/// The acquisition orchestrator - drives login, selection and retries.
pub struct AcquisitionOrchestrator {
    config: OrchestratorConfig,
    portal: Arc<dyn ReservationPortal>,
    solver: Arc<dyn CaptchaSolver>,
    cipher: Arc<dyn CredentialCipher>,
}

impl AcquisitionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        portal: Arc<dyn ReservationPortal>,
        solver: Arc<dyn CaptchaSolver>,
        cipher: Arc<dyn CredentialCipher>,
    ) -> Self {
        Self {
            config,
            portal,
            solver,
            cipher,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run until done: once, or until success when polling is enabled.
    ///
    /// Failures never escape as a panic or early exit; the outcome carries the
    /// last result and the retry bookkeeping.
    pub async fn run(&self) -> RunOutcome {
        let mut retry = RetryState::default();

        if !self.config.loop_enabled {
            info!("Single attempt mode");
            let result = self.acquire(&mut retry).await;
            return RunOutcome { result, retry };
        }

        info!(interval_ms = self.config.interval_ms, "Polling mode");
        loop {
            match self.acquire(&mut retry).await {
                Ok(report) => {
                    return RunOutcome {
                        result: Ok(report),
                        retry,
                    }
                }
                Err(e) => {
                    warn!(error = %e, kind = e.kind(), "No slot this round, polling again");
                }
            }

            info!(interval_ms = self.config.interval_ms, "Waiting before next attempt");
            tokio::time::sleep(Duration::from_millis(self.config.interval_ms)).await;
        }
    }

    /// Run attempts until one succeeds or the retry budget is spent.
    ///
    /// `retry` is shared across calls, so a budget spent in an earlier poll
    /// stays spent and later polls get a single attempt each.
    pub async fn acquire(
        &self,
        retry: &mut RetryState,
    ) -> Result<AcquisitionReport, AcquireError> {
        loop {
            retry.attempts += 1;
            match self.attempt().await {
                Ok(report) => {
                    retry.succeeded = true;
                    info!(
                        date = %report.date,
                        links = report.link_count(),
                        attempts = retry.attempts,
                        "Acquisition succeeded"
                    );
                    return Ok(report);
                }
                Err(e) if retry.retries_used < self.config.max_retry => {
                    retry.retries_used += 1;
                    warn!(
                        error = %e,
                        kind = e.kind(),
                        retry = retry.retries_used,
                        max_retry = self.config.max_retry,
                        "Acquisition attempt failed, retrying"
                    );
                }
                Err(e) => {
                    error!(
                        error = %e,
                        kind = e.kind(),
                        attempts = retry.attempts,
                        max_retry = self.config.max_retry,
                        "Acquisition attempt failed, retry budget exhausted"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// One full acquisition attempt on a fresh session.
    pub async fn attempt(&self) -> Result<AcquisitionReport, AcquireError> {
        let auth = LoginMachine::new(
            self.portal.as_ref(),
            self.solver.as_ref(),
            self.cipher.as_ref(),
            &self.config.credentials,
        )
        .with_captcha_limit(self.config.captcha_max_attempts)
        .with_debug(self.config.debug)
        .run()
        .await?;
        let session = auth.session;

        info!(
            hoscode = %self.config.target.hoscode,
            docid = %self.config.target.docid,
            "Querying available dates"
        );
        let html = self
            .portal
            .schedule_page(&session, &self.config.target.hoscode, &self.config.target.docid)
            .await?;
        let availability = parse_schedule_page(&html)?;
        if self.config.debug {
            debug!(
                dates = ?availability.dates().collect::<Vec<_>>(),
                availability = %serde_json::to_string(&availability).unwrap_or_default(),
                "Available dates"
            );
        }

        let selection = select_date(
            &availability,
            self.config.mode,
            self.config.date.as_deref(),
            self.config.loop_enabled,
            &mut rand::thread_rng(),
        )?;
        if self.config.debug {
            debug!(
                date = %selection.date,
                mode = %selection.effective_mode,
                records = ?selection.records,
                "Selected date"
            );
        }

        info!(date = %selection.date, blocks = selection.records.len(), "Querying time slots");
        let mut sessions = Vec::with_capacity(selection.records.len());
        for record in &selection.records {
            let slots = self.portal.time_slots(&session, record).await?;
            if self.config.debug {
                debug!(schcode = %record.schcode, session = %record.session_type, slots = ?slots, "Time slots");
            }
            sessions.push(SessionLinks {
                session_type: record.session_type,
                links: bookable_links(&self.config.base_url, record, &slots),
            });
        }

        Ok(AcquisitionReport {
            date: selection.date,
            sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionMode;
    use crate::orchestrator::{Credentials, SiteTarget};
    use crate::portal::LoginResponse;
    use crate::schedule::SessionType;
    use crate::testing::{fixtures, MockCaptchaSolver, MockPortal};
    use crate::cipher::PortalCipher;

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            credentials: Credentials {
                username: "user".to_string(),
                password: "pass".to_string(),
            },
            target: SiteTarget {
                hoscode: "320100".to_string(),
                docid: "4411".to_string(),
            },
            mode: SelectionMode::Random,
            date: None,
            loop_enabled: false,
            interval_ms: 5,
            max_retry: 0,
            captcha_max_attempts: None,
            base_url: "https://portal.test/njres".to_string(),
            debug: true,
        }
    }

    fn orchestrator(config: OrchestratorConfig, portal: &Arc<MockPortal>) -> AcquisitionOrchestrator {
        AcquisitionOrchestrator::new(
            config,
            Arc::clone(portal) as Arc<dyn ReservationPortal>,
            Arc::new(MockCaptchaSolver::new()),
            Arc::new(PortalCipher::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_attempt_collects_links_per_session() {
        let portal = Arc::new(MockPortal::new());
        portal
            .push_schedule_page(fixtures::schedule_page(&[(
                "2024-05-01",
                Some("AM1"),
                Some("PM1"),
            )]))
            .await;
        portal
            .set_time_slots("AM1", vec![fixtures::time_slot("S1", 1), fixtures::time_slot("S2", 0)])
            .await;
        portal
            .set_time_slots("PM1", vec![fixtures::time_slot("S3", 1)])
            .await;

        let report = orchestrator(config(), &portal).attempt().await.unwrap();

        assert_eq!(report.date, "2024-05-01");
        assert_eq!(report.sessions.len(), 2);
        assert_eq!(report.sessions[0].session_type, SessionType::Am);
        assert_eq!(
            report.sessions[0].links,
            vec!["https://portal.test/njres/reservation/hos_toConfirm.do?schcode=AM1&hosCfgCode=S1"]
        );
        assert_eq!(report.sessions[1].session_type, SessionType::Pm);
        assert_eq!(report.sessions[1].links.len(), 1);
        assert_eq!(portal.time_slot_queries().await, vec!["AM1", "PM1"]);
    }

    #[tokio::test]
    async fn test_parse_failure_is_attempt_error() {
        let portal = Arc::new(MockPortal::new());
        portal
            .push_schedule_page(
                r#"<table class="yy_paiban"><thead><tr><th></th><th><b>2024-05-01</b></th></tr></thead>
                <tbody><tr><td>am</td><td><div class="doc_yuyue_time"><a href="javascript:go('1','2')">x</a></div></td></tr>
                <tr><td>pm</td><td></td></tr></tbody></table>"#
                    .to_string(),
            )
            .await;

        let err = orchestrator(config(), &portal).attempt().await.unwrap_err();
        assert!(matches!(err, AcquireError::Parse(_)));
    }

    #[tokio::test]
    async fn test_acquire_retries_up_to_budget() {
        let portal = Arc::new(MockPortal::new());
        portal
            .push_login_responses(vec![
                LoginResponse {
                    flag_state: 0,
                    message: "locked".to_string(),
                };
                4
            ])
            .await;
        let mut cfg = config();
        cfg.max_retry = 2;

        let orch = orchestrator(cfg, &portal);
        let mut retry = RetryState::default();
        let err = orch.acquire(&mut retry).await.unwrap_err();

        assert!(matches!(err, AcquireError::Authentication { .. }));
        assert_eq!(retry.attempts, 3);
        assert_eq!(retry.retries_used, 2);
        assert!(!retry.succeeded);
        assert_eq!(portal.handshake_count().await, 3);

        // Budget stays spent: the next call gets exactly one try.
        let _ = orch.acquire(&mut retry).await;
        assert_eq!(retry.attempts, 4);
        assert_eq!(retry.retries_used, 2);
    }

    #[tokio::test]
    async fn test_acquire_recovers_within_budget() {
        let portal = Arc::new(MockPortal::new());
        portal
            .push_schedule_pages(vec![
                fixtures::schedule_page(&[]),
                fixtures::schedule_page(&[("2024-05-02", None, Some("PM9"))]),
            ])
            .await;
        portal
            .set_time_slots("PM9", vec![fixtures::time_slot("T1", 1)])
            .await;
        let mut cfg = config();
        cfg.max_retry = 1;

        let mut retry = RetryState::default();
        let report = orchestrator(cfg, &portal)
            .acquire(&mut retry)
            .await
            .unwrap();

        assert_eq!(report.date, "2024-05-02");
        assert_eq!(retry.attempts, 2);
        assert_eq!(retry.retries_used, 1);
        assert!(retry.succeeded);
    }

    #[tokio::test]
    async fn test_run_single_mode_returns_failure() {
        let portal = Arc::new(MockPortal::new());
        portal.push_schedule_page(fixtures::schedule_page(&[])).await;

        let outcome = orchestrator(config(), &portal).run().await;

        assert!(matches!(outcome.result, Err(AcquireError::NoAvailability)));
        assert_eq!(outcome.retry.attempts, 1);
        assert_eq!(portal.schedule_page_count().await, 1);
    }
}
