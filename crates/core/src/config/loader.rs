use figment::{
    providers::{Env, Format, Toml, Yaml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides (e.g. `SLOTGRAB_MAX_RETRY=3`).
pub const ENV_PREFIX: &str = "SLOTGRAB_";

/// Separator for nested keys in environment overrides
/// (e.g. `SLOTGRAB_TESSERACT__LANG=chi_sim`).
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Load configuration from file with environment variable overrides.
///
/// `.toml` files are read as TOML, everything else as YAML.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Figment::new().merge(Toml::file(path)),
        _ => Figment::new().merge(Yaml::file(path)),
    };

    // Env keys are lowercased, so `debugMode` is set via SLOTGRAB_DEBUG_MODE.
    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_NESTING_SEPARATOR))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
pub fn load_config_from_str(yaml: &str) -> Result<Config, ConfigError> {
    Figment::from(Yaml::string(yaml))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionMode;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_config_from_str_missing_credentials() {
        let yaml = r#"
hoscode: 1
docid: 2
"#;
        let result = load_config_from_str(yaml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.yml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_yaml_file() {
        let mut temp_file = Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            temp_file,
            r#"
username: someone
password: secret
hoscode: 320100
docid: 4411
mode: order
date: "2024-05-01"
max_retry: 2
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.username, "someone");
        assert_eq!(config.mode, SelectionMode::Order);
        assert_eq!(config.max_retry, 2);
    }

    #[test]
    fn test_load_config_from_toml_file() {
        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            temp_file,
            r#"
username = "someone"
password = "secret"
hoscode = "320100"
docid = "4411"
loop = true
interval = 500
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert!(config.loop_enabled);
        assert_eq!(config.interval, 500);
        assert_eq!(config.hoscode, "320100");
    }

    #[test]
    fn test_env_overrides_flat_and_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yml",
                "username: u\npassword: p\nhoscode: 1\ndocid: 2\ntesseract:\n  lang: eng\n",
            )?;
            jail.set_env("SLOTGRAB_MAX_RETRY", "4");
            jail.set_env("SLOTGRAB_DEBUG_MODE", "true");
            jail.set_env("SLOTGRAB_TESSERACT__LANG", "chi_sim");
            jail.set_env("SLOTGRAB_TESSERACT__PSM", "7");

            let config = load_config(Path::new("config.yml")).map_err(|e| e.to_string())?;
            assert_eq!(config.max_retry, 4);
            assert!(config.debug_mode);
            assert_eq!(config.tesseract.lang, "chi_sim");
            assert_eq!(config.tesseract.psm, Some(7));
            assert_eq!(config.tesseract.path, std::path::PathBuf::from("tesseract"));
            Ok(())
        });
    }

    #[test]
    fn test_load_config_malformed_file() {
        let mut temp_file = Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(temp_file, "username: [unterminated").unwrap();

        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
