//! Capacity ceiling and early-warning threshold for sessions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default hard ceiling on messages per session.
pub const DEFAULT_MAX_MESSAGES: usize = 1000;

/// Default fraction of the ceiling at which alerts become due.
pub const DEFAULT_ALERT_THRESHOLD_RATIO: f64 = 0.9;

// Keeps products such as 0.29 * 100 from flooring to 28.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// When a threshold alert is raised for an append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Alert on every append whose resulting count is at or above the
    /// threshold.
    #[default]
    EveryAppend,
    /// Alert only on the append that moves the count from below the threshold
    /// to at or above it.
    OnCrossing,
}

/// Errors raised while validating session limits.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LimitsError {
    /// The ceiling must allow at least one message.
    #[error("max messages must be at least 1, got {0}")]
    InvalidMaxMessages(usize),

    /// The ratio must be a finite value in (0, 1].
    #[error("alert threshold ratio must be in (0, 1], got {0}")]
    InvalidThresholdRatio(f64),
}

/// Validated capacity limits shared by every session a manager handles.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::{AlertPolicy, SessionLimits};
///
/// let limits = SessionLimits::try_new(1000, 0.9, AlertPolicy::EveryAppend)
///     .expect("valid limits");
/// assert_eq!(limits.alert_threshold(), 900);
/// assert!(limits.alert_due(899, 900));
/// assert!(!limits.alert_due(100, 101));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    max_messages: usize,
    alert_threshold: usize,
    policy: AlertPolicy,
}

impl SessionLimits {
    /// Validates a ceiling and threshold ratio.
    ///
    /// The threshold is `floor(max_messages * ratio)`.
    ///
    /// # Errors
    ///
    /// Returns [`LimitsError`] when the ceiling is zero or the ratio is not a
    /// finite value in `(0, 1]`.
    pub fn try_new(
        max_messages: usize,
        alert_threshold_ratio: f64,
        policy: AlertPolicy,
    ) -> Result<Self, LimitsError> {
        if max_messages == 0 {
            return Err(LimitsError::InvalidMaxMessages(max_messages));
        }
        if !alert_threshold_ratio.is_finite()
            || alert_threshold_ratio <= 0.0
            || alert_threshold_ratio > 1.0
        {
            return Err(LimitsError::InvalidThresholdRatio(alert_threshold_ratio));
        }

        Ok(Self {
            max_messages,
            alert_threshold: threshold_for(max_messages, alert_threshold_ratio),
            policy,
        })
    }

    /// Returns the hard ceiling.
    #[must_use]
    pub const fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Returns the message count at which alerts become due.
    #[must_use]
    pub const fn alert_threshold(&self) -> usize {
        self.alert_threshold
    }

    /// Returns the alert repeat policy.
    #[must_use]
    pub const fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Returns a copy using a different alert policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns `true` when a session already holds the maximum number of
    /// messages.
    #[must_use]
    pub const fn is_full(&self, message_count: usize) -> bool {
        message_count >= self.max_messages
    }

    /// Decides whether an append that moved the count from `previous_count`
    /// to `new_count` should raise an alert.
    #[must_use]
    pub const fn alert_due(&self, previous_count: usize, new_count: usize) -> bool {
        match self.policy {
            AlertPolicy::EveryAppend => new_count >= self.alert_threshold,
            AlertPolicy::OnCrossing => {
                previous_count < self.alert_threshold && new_count >= self.alert_threshold
            }
        }
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            alert_threshold: threshold_for(DEFAULT_MAX_MESSAGES, DEFAULT_ALERT_THRESHOLD_RATIO),
            policy: AlertPolicy::default(),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ceilings are far below 2^52 and the ratio is validated to (0, 1]"
)]
fn threshold_for(max_messages: usize, ratio: f64) -> usize {
    let scaled = (max_messages as f64).mul_add(ratio, THRESHOLD_EPSILON).floor();
    (scaled as usize).min(max_messages)
}
