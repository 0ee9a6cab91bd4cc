use super::{
    types::{Config, SelectionMode},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Credentials and site identifiers are present
/// - `order` mode carries a date
/// - The username can be encrypted (Latin-1 only)
/// - Captcha ceiling and HTTP timeout are non-zero when given
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let required = [
        ("username", &config.username),
        ("password", &config.password),
        ("hoscode", &config.hoscode),
        ("docid", &config.docid),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if let Some(c) = config.username.chars().find(|c| u32::from(*c) > 0xFF) {
        return Err(ConfigError::ValidationError(format!(
            "username contains {:?}, only Latin-1 characters can be encrypted",
            c
        )));
    }

    // Matched verbatim against the date labels of the schedule page.
    if config.mode == SelectionMode::Order
        && config.date.as_deref().is_none_or(|d| d.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "date is required when mode is order".to_string(),
        ));
    }

    if config.captcha_max_attempts == Some(0) {
        return Err(ConfigError::ValidationError(
            "captcha_max_attempts cannot be 0".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
