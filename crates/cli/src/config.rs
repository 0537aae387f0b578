use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/cli.toml";

/// Environment variable holding the password; it is never read from flags.
pub const PASSWORD_ENV: &str = "COLLECTA_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            username: String::new(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Input(format!("unknown timezone: {}", self.timezone)))
    }
}

/// Command-line overrides applied on top of the file and environment.
#[derive(Debug, Default, clap::Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long, global = true)]
    pub username: Option<String>,
    /// Override timezone used for dates (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
}

pub fn load(overrides: Overrides) -> Result<AppConfig> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("COLLECTA_CLI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = overrides.username {
        settings.username = username;
    }
    if let Some(timezone) = overrides.timezone {
        settings.timezone = timezone;
    }

    if settings.username.is_empty() {
        return Err(AppError::Input(
            "username missing: set it in the config file or pass --username".to_string(),
        ));
    }

    Ok(settings)
}

pub fn password() -> Result<String> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|password| !password.is_empty())
        .ok_or_else(|| AppError::Input(format!("{PASSWORD_ENV} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let settings = load(Overrides {
            config: Some("does-not-exist".to_string()),
            base_url: Some("http://collecta.local".to_string()),
            username: Some("ravi".to_string()),
            timezone: Some("UTC".to_string()),
        })
        .unwrap();

        assert_eq!(settings.base_url, "http://collecta.local");
        assert_eq!(settings.username, "ravi");
        assert_eq!(settings.tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let settings = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(settings.tz(), Err(AppError::Input(_))));
    }

    #[test]
    fn default_timezone_parses() {
        assert_eq!(
            AppConfig::default().tz().unwrap(),
            chrono_tz::Asia::Kolkata
        );
    }
}
