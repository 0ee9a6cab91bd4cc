//! Acquisition orchestrator.
//!
//! Drives one acquisition attempt end to end and retries it:
//! - **Login**: captcha-gated state machine, misread captchas loop back silently
//! - **Selection**: picks a date from the availability map per the configured mode
//! - **Retry**: failed attempts are re-run while the run-wide budget lasts
//! - **Polling**: optional outer loop that waits `interval` between attempts
//!
//! Everything runs sequentially on the caller's task.

mod config;
mod login;
mod runner;
mod selection;
mod types;

pub use config::{Credentials, OrchestratorConfig, SiteTarget};
pub use login::{AuthenticatedSession, LoginMachine, LoginState};
pub use runner::AcquisitionOrchestrator;
pub use selection::{select_date, Selection};
pub use types::{AcquireError, AcquisitionReport, RetryState, RunOutcome, SessionLinks};
