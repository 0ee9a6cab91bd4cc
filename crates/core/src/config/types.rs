use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Root configuration, loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub username: String,
    pub password: String,
    /// Provider (hospital) code on the platform.
    #[serde(deserialize_with = "string_or_number")]
    pub hoscode: String,
    /// Doctor id on the platform.
    #[serde(deserialize_with = "string_or_number")]
    pub docid: String,
    #[serde(default)]
    pub mode: SelectionMode,
    /// Target date (`YYYY-MM-DD`), only consulted in `order` mode.
    #[serde(default)]
    pub date: Option<String>,
    /// Keep polling until a slot is found.
    #[serde(rename = "loop", default)]
    pub loop_enabled: bool,
    /// Delay between polling attempts (milliseconds).
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Cap on re-attempts after a failed acquisition, cumulative for the run.
    #[serde(default)]
    pub max_retry: u32,
    #[serde(rename = "debugMode", alias = "debug_mode", default)]
    pub debug_mode: bool,
    /// Upper bound on captcha rounds within one login. Unset means unlimited.
    #[serde(default)]
    pub captcha_max_attempts: Option<u32>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default)]
    pub tesseract: TesseractConfig,
}

/// How a date is picked from the availability map.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Book the configured `date`.
    Order,
    /// Book any currently available date.
    #[default]
    Random,
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Order => write!(f, "order"),
            SelectionMode::Random => write!(f, "random"),
        }
    }
}

/// Tesseract OCR configuration for the captcha solver.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TesseractConfig {
    /// Path to the tesseract binary.
    #[serde(default = "default_tesseract_path")]
    pub path: PathBuf,
    /// Recognition language.
    #[serde(default = "default_tesseract_lang")]
    pub lang: String,
    /// Page segmentation mode (`--psm`), tesseract's default when unset.
    #[serde(default)]
    pub psm: Option<u8>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            path: default_tesseract_path(),
            lang: default_tesseract_lang(),
            psm: None,
        }
    }
}

fn default_interval() -> u64 {
    1000
}

fn default_base_url() -> String {
    "https://www.nj12320.org/njres".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_tesseract_lang() -> String {
    "eng".to_string()
}

/// Site identifiers show up both quoted and bare in hand-written config files.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}

/// Sanitized config for debug output (password redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub username: String,
    pub password_configured: bool,
    pub hoscode: String,
    pub docid: String,
    pub mode: SelectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "loop")]
    pub loop_enabled: bool,
    pub interval: u64,
    pub max_retry: u32,
    #[serde(rename = "debugMode")]
    pub debug_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_max_attempts: Option<u32>,
    pub base_url: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            username: config.username.clone(),
            password_configured: !config.password.is_empty(),
            hoscode: config.hoscode.clone(),
            docid: config.docid.clone(),
            mode: config.mode,
            date: config.date.clone(),
            loop_enabled: config.loop_enabled,
            interval: config.interval,
            max_retry: config.max_retry,
            debug_mode: config.debug_mode,
            captcha_max_attempts: config.captcha_max_attempts,
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}
