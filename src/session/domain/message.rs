//! Immutable messages appended to a session.

use super::{MessageId, ParseRoleError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The party that opened the conversation.
    Originator,
    /// An automated assistant replying to the originator.
    Assistant,
    /// Instructions or notices injected by the platform.
    System,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Originator => "originator",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "originator" | "user" => Ok(Self::Originator),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a session's message log.
///
/// Messages are never modified after creation.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::{Message, Role};
/// use mockable::DefaultClock;
///
/// let message = Message::new(Role::Originator, "Where is my order?", &DefaultClock);
/// assert_eq!(message.role(), Role::Originator);
/// assert_eq!(message.content(), "Where is my order?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message with a fresh identifier and the current time.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, clock: &impl Clock) -> Self {
        Self::new_with_id(MessageId::new(), role, content, clock)
    }

    /// Creates a message with a caller-chosen identifier.
    ///
    /// Reusing an identifier lets a caller retry an append without risking a
    /// second copy of the same message.
    #[must_use]
    pub fn new_with_id(
        id: MessageId,
        role: Role,
        content: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: clock.utc(),
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the message role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the opaque text payload.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
