use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;

pub const SMTP_USERNAME_ENV: &str = "SWING_SMTP_USERNAME";
pub const SMTP_PASSWORD_ENV: &str = "SWING_SMTP_PASSWORD";

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_chart_dir() -> String {
    ".".into()
}

fn default_symbol() -> String {
    "AMZN".into()
}

fn default_range() -> String {
    "3mo".into()
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}

fn default_smtp_port() -> u16 {
    465
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Directory the alert chart PNG is written to.
    #[serde(default = "default_chart_dir")]
    pub chart_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            chart_dir: default_chart_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Trailing history window requested from the provider.
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            range: default_range(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender address; empty means "use the SMTP username".
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            from: String::new(),
            to: String::new(),
        }
    }
}

/// SMTP login, read from the environment and never from the config file.
#[derive(Clone)]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl MailCredentials {
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Report<ConfigError>> {
        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Report::new(ConfigError::MissingEnv { name: name.into() }))
        };
        Ok(Self {
            username: read(SMTP_USERNAME_ENV)?,
            password: read(SMTP_PASSWORD_ENV)?,
        })
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
///
/// When `required` is false a missing file yields the default configuration.
pub fn load(path: &Path, required: bool) -> Result<AppConfig, Report<ConfigError>> {
    if !required && !path.exists() {
        let config = AppConfig::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];
// Shorter ranges cannot warm up SMA(50) on daily bars.
const VALID_RANGES: &[&str] = &["3mo", "6mo", "1y", "2y", "5y", "max"];

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_market(config)?;
    validate_mail(config)?;
    Ok(())
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let format = config.general.log_format.as_str();
    if !VALID_LOG_FORMATS.contains(&format) {
        return Err(Report::new(ConfigError::Validation {
            field: format!("general.log_format \"{format}\" is not valid"),
        }));
    }
    Ok(())
}

fn validate_market(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let symbol = config.market.symbol.as_str();
    if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
        return Err(Report::new(ConfigError::Validation {
            field: format!("market.symbol \"{symbol}\" is not a ticker"),
        }));
    }

    let range = config.market.range.as_str();
    if !VALID_RANGES.contains(&range) {
        return Err(Report::new(ConfigError::Validation {
            field: format!("market.range \"{range}\" is not valid"),
        }));
    }
    Ok(())
}

fn validate_mail(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.mail.smtp_port == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "mail.smtp_port must be > 0".into(),
        }));
    }
    if config.mail.smtp_host.trim().is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "mail.smtp_host must not be empty".into(),
        }));
    }
    Ok(())
}

/// Checks that apply only when the run will actually send mail.
pub fn validate_delivery(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.mail.to.trim().is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "mail.to is required unless --dry-run is set".into(),
        }));
    }
    Ok(())
}
