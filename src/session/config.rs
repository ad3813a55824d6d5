//! Configuration for the session manager.
//!
//! Settings can come from a TOML document, from environment variables, or
//! from defaults. Validation happens once, when [`SessionConfig::validate`]
//! checks the timeouts and turns the raw limits into [`SessionLimits`].

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::session::{
    domain::{
        AlertPolicy, DEFAULT_ALERT_THRESHOLD_RATIO, DEFAULT_MAX_MESSAGES, LimitsError,
        SessionLimits,
    },
    services::dispatch::{DEFAULT_ALERT_BUFFER, DEFAULT_ALERT_SINK_TIMEOUT},
};

/// Environment variable overriding the message ceiling.
pub const MAX_MESSAGES_ENV: &str = "MAX_MESSAGES";

/// Environment variable overriding the alert threshold ratio.
pub const ALERT_THRESHOLD_RATIO_ENV: &str = "ALERT_THRESHOLD_RATIO";

/// Default bound on a single store round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The limits are out of range.
    #[error(transparent)]
    Limits(#[from] LimitsError),

    /// An override could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// The offending setting.
        key: &'static str,
        /// The raw value.
        value: String,
    },

    /// A setting that must be positive is zero.
    #[error("{key} must be greater than zero")]
    MustBePositive {
        /// The offending setting.
        key: &'static str,
    },

    /// The TOML document is malformed.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Raw session manager settings.
///
/// # Examples
///
/// ```
/// use colloquy::session::config::SessionConfig;
///
/// let config = SessionConfig::from_toml_str("max_messages = 50\nalert_policy = \"on_crossing\"")
///     .expect("valid toml");
/// let limits = config.limits().expect("valid limits");
/// assert_eq!(limits.max_messages(), 50);
/// assert_eq!(limits.alert_threshold(), 45);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Hard ceiling on messages per session.
    pub max_messages: usize,
    /// Fraction of the ceiling at which alerts become due.
    pub alert_threshold_ratio: f64,
    /// Alert repeat policy.
    pub alert_policy: AlertPolicy,
    /// Bound on a single store round-trip, in milliseconds.
    pub store_timeout_ms: u64,
    /// Capacity of the alert queue.
    pub alert_buffer: usize,
    /// Bound on a single alert delivery, in milliseconds.
    pub alert_sink_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            alert_threshold_ratio: DEFAULT_ALERT_THRESHOLD_RATIO,
            alert_policy: AlertPolicy::default(),
            store_timeout_ms: duration_millis(DEFAULT_STORE_TIMEOUT),
            alert_buffer: DEFAULT_ALERT_BUFFER,
            alert_sink_timeout_ms: duration_millis(DEFAULT_ALERT_SINK_TIMEOUT),
        }
    }
}

impl SessionConfig {
    /// Parses settings from a TOML document. Missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] when the document is malformed or names
    /// an unknown key.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Builds settings from defaults plus `MAX_MESSAGES` and
    /// `ALERT_THRESHOLD_RATIO` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when an override does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when an override does not parse.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(MAX_MESSAGES_ENV) {
            self.max_messages = parse_override(MAX_MESSAGES_ENV, &raw)?;
        }
        if let Some(raw) = lookup(ALERT_THRESHOLD_RATIO_ENV) {
            self.alert_threshold_ratio = parse_override(ALERT_THRESHOLD_RATIO_ENV, &raw)?;
        }
        Ok(self)
    }

    /// Validates every setting and returns the limits to enforce.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MustBePositive`] when a timeout or the alert
    /// buffer is zero, or [`ConfigError::Limits`] when the limits are invalid.
    pub fn validate(&self) -> Result<SessionLimits, ConfigError> {
        self.validate_alerting()?;
        require_positive("store_timeout_ms", self.store_timeout_ms)?;
        self.limits()
    }

    /// Validates the alert queue settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MustBePositive`] when `alert_buffer` or
    /// `alert_sink_timeout_ms` is zero.
    pub fn validate_alerting(&self) -> Result<(), ConfigError> {
        require_positive("alert_buffer", self.alert_buffer)?;
        require_positive("alert_sink_timeout_ms", self.alert_sink_timeout_ms)
    }

    /// Validates the ceiling and threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Limits`] when the ceiling is zero or the ratio
    /// is outside `(0, 1]`.
    pub fn limits(&self) -> Result<SessionLimits, ConfigError> {
        Ok(SessionLimits::try_new(
            self.max_messages,
            self.alert_threshold_ratio,
            self.alert_policy,
        )?)
    }

    /// Returns the store round-trip bound.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Returns the alert delivery bound.
    #[must_use]
    pub const fn alert_sink_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_sink_timeout_ms)
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
    })
}

fn require_positive<T: Default + PartialEq>(key: &'static str, value: T) -> Result<(), ConfigError> {
    if value == T::default() {
        return Err(ConfigError::MustBePositive { key });
    }
    Ok(())
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
