pub mod captcha;
pub mod cipher;
pub mod config;
pub mod orchestrator;
pub mod portal;
pub mod schedule;
pub mod testing;

pub use captcha::{CaptchaError, CaptchaSolver, TesseractSolver};
pub use cipher::{CipherError, CredentialCipher, PortalCipher};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    SelectionMode, TesseractConfig,
};
pub use orchestrator::{
    AcquireError, AcquisitionOrchestrator, AcquisitionReport, OrchestratorConfig, RetryState,
    RunOutcome, SessionLinks,
};
pub use portal::{Nj12320Portal, PortalError, ReservationPortal, Session};
pub use schedule::{
    AvailabilityMap, DateScheduleInfo, ParseError, SessionType, TimeScheduleInfo,
};
