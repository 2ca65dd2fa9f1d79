//! Layered application configuration.
//!
//! # Responsibility
//! - Merge built-in defaults, an optional config file and `BOOKING__*`
//!   environment variables into one typed `AppConfig`.
//! - Keep relay credentials out of source and out of `Debug` output.
//!
//! # Invariants
//! - Later sources override earlier ones: defaults < file < environment.
//! - When notifications are enabled, every relay field must be set.

use crate::logging::default_log_level;
use crate::storage::CorruptPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BOOKING";
pub const ENV_SEPARATOR: &str = "__";
pub const DEFAULT_STORAGE_PATH: &str = "bookings.json";
pub const DEFAULT_TIMESLOTS_PATH: &str = "timeslots.json";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SERVICE_LABEL: &str = "Haircut - $15";

#[derive(Debug)]
pub enum ConfigError {
    Source(config::ConfigError),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "failed to load configuration: {err}"),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Source(value)
    }
}

/// String whose value never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Debug for SecretString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(***)")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    /// Slot schedule file, kept apart from the booking collection.
    pub timeslots_path: PathBuf,
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub service_label: String,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: SecretString,
    /// Display name on the `From` header.
    #[serde(default)]
    pub from_name: Option<String>,
    /// Sender address; defaults to `username`.
    #[serde(default)]
    pub from_address: Option<String>,
    /// Fixed recipient, typically an SMS-gateway alias.
    #[serde(default)]
    pub to: String,
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_smtp_timeout_secs() -> u64 {
    DEFAULT_SMTP_TIMEOUT_SECS
}

impl AppConfig {
    /// Loads configuration from defaults, `file` and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, None)
    }

    /// Same as `load`, but reads environment variables from `env` when given.
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("storage.path", DEFAULT_STORAGE_PATH)?
            .set_default("storage.timeslots_path", DEFAULT_TIMESLOTS_PATH)?
            .set_default("storage.on_corrupt", "fail")?
            .set_default("logging.level", default_log_level())?
            .set_default("notify.enabled", false)?
            .set_default("notify.service_label", DEFAULT_SERVICE_LABEL)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .source(env),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field requirements that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.path cannot be empty".into()));
        }
        if self.storage.timeslots_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.timeslots_path cannot be empty".into(),
            ));
        }
        if self.storage.timeslots_path == self.storage.path {
            return Err(ConfigError::Invalid(
                "storage.timeslots_path must differ from storage.path".into(),
            ));
        }
        if !self.notify.enabled {
            return Ok(());
        }

        let smtp = &self.notify.smtp;
        let missing: Vec<&str> = [
            ("notify.smtp.host", smtp.host.trim().is_empty()),
            ("notify.smtp.username", smtp.username.trim().is_empty()),
            ("notify.smtp.password", smtp.password.is_empty()),
            ("notify.smtp.to", smtp.to.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(key, is_missing)| is_missing.then_some(key))
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "notifications are enabled but {} not set",
                missing.join(", ")
            )));
        }
        if smtp.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "notify.smtp.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
