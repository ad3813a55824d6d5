//! Threshold notifications raised as sessions approach their ceiling.

use super::SessionId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity attached to a session alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// The session is close to its ceiling.
    Warning,
}

impl AlertSeverity {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification that a session's message count reached the alert threshold.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::{AlertSeverity, SessionId, ThresholdAlert};
/// use mockable::DefaultClock;
///
/// let id = SessionId::new("support-42").expect("valid id");
/// let alert = ThresholdAlert::new(id, 900, 1000, &DefaultClock);
/// assert_eq!(alert.severity(), AlertSeverity::Warning);
/// assert_eq!(alert.usage(), (900, 1000));
/// assert_eq!(alert.message(), "session support-42 holds 900 of 1000 messages");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdAlert {
    severity: AlertSeverity,
    session_id: SessionId,
    message_count: usize,
    max_messages: usize,
    raised_at: DateTime<Utc>,
}

impl ThresholdAlert {
    /// Creates a warning for a session holding `message_count` of
    /// `max_messages` messages.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        message_count: usize,
        max_messages: usize,
        clock: &impl Clock,
    ) -> Self {
        Self {
            severity: AlertSeverity::Warning,
            session_id,
            message_count,
            max_messages,
            raised_at: clock.utc(),
        }
    }

    /// Returns the alert severity.
    #[must_use]
    pub const fn severity(&self) -> AlertSeverity {
        self.severity
    }

    /// Returns the session the alert refers to.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the message count produced by the triggering append.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.message_count
    }

    /// Returns the configured ceiling.
    #[must_use]
    pub const fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Returns `(message_count, max_messages)`.
    #[must_use]
    pub const fn usage(&self) -> (usize, usize) {
        (self.message_count, self.max_messages)
    }

    /// Returns when the alert was raised.
    #[must_use]
    pub const fn raised_at(&self) -> DateTime<Utc> {
        self.raised_at
    }

    /// Renders the human-readable alert text.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "session {} holds {} of {} messages",
            self.session_id, self.message_count, self.max_messages
        )
    }
}
