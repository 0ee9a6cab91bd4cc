//! Orchestrator configuration.

use crate::config::{Config, SelectionMode};

/// Login credentials, in plain text until the cipher runs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Provider/doctor pair whose schedule is polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    pub hoscode: String,
    pub docid: String,
}

/// Configuration for the acquisition orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub credentials: Credentials,
    pub target: SiteTarget,

    /// Date selection mode.
    pub mode: SelectionMode,

    /// Wanted date, consulted in `order` mode only.
    pub date: Option<String>,

    /// Keep polling until an attempt succeeds.
    pub loop_enabled: bool,

    /// Delay between polling attempts (milliseconds).
    pub interval_ms: u64,

    /// Re-attempts allowed after failures, counted across the whole run.
    pub max_retry: u32,

    /// Captcha rounds allowed per login (None = unlimited).
    pub captcha_max_attempts: Option<u32>,

    /// Root of the confirmation links.
    pub base_url: String,

    /// Emit debug dumps of intermediate data.
    pub debug: bool,
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            credentials: Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            target: SiteTarget {
                hoscode: config.hoscode.clone(),
                docid: config.docid.clone(),
            },
            mode: config.mode,
            date: config.date.clone(),
            loop_enabled: config.loop_enabled,
            interval_ms: config.interval,
            max_retry: config.max_retry,
            captcha_max_attempts: config.captcha_max_attempts,
            base_url: config.base_url.clone(),
            debug: config.debug_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_from_config() {
        let config = load_config_from_str(
            r#"
username: user
password: pass
hoscode: 320100
docid: 4411
mode: order
date: "2024-05-01"
loop: true
interval: 250
max_retry: 3
debugMode: true
captcha_max_attempts: 9
"#,
        )
        .unwrap();

        let orch = OrchestratorConfig::from(&config);
        assert_eq!(orch.credentials.username, "user");
        assert_eq!(orch.target.hoscode, "320100");
        assert_eq!(orch.target.docid, "4411");
        assert_eq!(orch.mode, SelectionMode::Order);
        assert_eq!(orch.date.as_deref(), Some("2024-05-01"));
        assert!(orch.loop_enabled);
        assert_eq!(orch.interval_ms, 250);
        assert_eq!(orch.max_retry, 3);
        assert_eq!(orch.captcha_max_attempts, Some(9));
        assert!(orch.debug);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "user".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
