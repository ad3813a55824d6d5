//! The bounded session aggregate.

use super::{Message, SessionDomainError, SessionId, SessionLimits, Version};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A capacity-bounded, append-only conversational record.
///
/// # Invariants
///
/// - `message_count()` always equals `messages().len()`
/// - message identifiers are unique within the session
/// - once archived, no transition adds messages
///
/// The version is assigned by the store on each successful write; domain
/// transitions never touch it.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::{Message, Role, Session, SessionId, SessionLimits};
/// use mockable::DefaultClock;
///
/// let clock = DefaultClock;
/// let mut session = Session::new(SessionId::generate(), &clock);
/// session
///     .append(Message::new(Role::Originator, "hi", &clock), &SessionLimits::default(), &clock)
///     .expect("room for one more");
/// assert_eq!(session.message_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedSessionData")]
pub struct Session {
    id: SessionId,
    messages: Vec<Message>,
    message_count: usize,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_archived: bool,
    version: Version,
}

/// Parameter object for reconstructing a persisted session.
///
/// Deserializing a [`Session`] goes through this type, so serialized
/// sessions get the same count check as database rows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistedSessionData {
    /// Persisted session identifier.
    pub id: SessionId,
    /// Persisted messages in insertion order.
    pub messages: Vec<Message>,
    /// Persisted redundant message count.
    pub message_count: usize,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted timestamp of the last successful mutation.
    pub updated_at: DateTime<Utc>,
    /// Persisted archive flag.
    pub is_archived: bool,
    /// Persisted version token.
    pub version: Version,
}

impl Session {
    /// Creates an empty, active session at the initial version.
    #[must_use]
    pub fn new(id: SessionId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            messages: Vec::new(),
            message_count: 0,
            created_at: timestamp,
            updated_at: timestamp,
            is_archived: false,
            version: Version::initial(),
        }
    }

    /// Reconstructs a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::CountMismatch`] when the stored count has
    /// drifted from the stored messages.
    pub fn from_persisted(data: PersistedSessionData) -> Result<Self, SessionDomainError> {
        if data.message_count != data.messages.len() {
            return Err(SessionDomainError::CountMismatch {
                recorded: data.message_count,
                actual: data.messages.len(),
            });
        }

        Ok(Self {
            id: data.id,
            messages: data.messages,
            message_count: data.message_count,
            created_at: data.created_at,
            updated_at: data.updated_at,
            is_archived: data.is_archived,
            version: data.version,
        })
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the messages in chronological order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.message_count
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the last successful mutation.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` once the session is closed to appends.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.is_archived
    }

    /// Returns the optimistic concurrency token observed when loaded.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns a copy carrying the version assigned by a store write.
    ///
    /// Store adapters call this when recording a successful write.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Checks whether one more message may be appended.
    ///
    /// Archive state is checked before capacity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::Archived`] for archived sessions and
    /// [`SessionDomainError::CapacityReached`] when the ceiling is reached.
    pub const fn ensure_accepts_messages(
        &self,
        limits: &SessionLimits,
    ) -> Result<(), SessionDomainError> {
        if self.is_archived {
            return Err(SessionDomainError::Archived);
        }
        if limits.is_full(self.message_count) {
            return Err(SessionDomainError::CapacityReached {
                max_messages: limits.max_messages(),
            });
        }
        Ok(())
    }

    /// Appends a message and refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::Archived`],
    /// [`SessionDomainError::CapacityReached`] or
    /// [`SessionDomainError::DuplicateMessage`], checked in that order. The
    /// session is unchanged on error.
    pub fn append(
        &mut self,
        message: Message,
        limits: &SessionLimits,
        clock: &impl Clock,
    ) -> Result<(), SessionDomainError> {
        self.ensure_accepts_messages(limits)?;
        if self.contains_message(&message) {
            return Err(SessionDomainError::DuplicateMessage(message.id()));
        }

        self.messages.push(message);
        self.message_count = self.messages.len();
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Closes the session to further appends.
    ///
    /// Returns `false` without touching the session when it is already
    /// archived.
    pub fn archive(&mut self, clock: &impl Clock) -> bool {
        if self.is_archived {
            return false;
        }
        self.is_archived = true;
        self.updated_at = clock.utc();
        true
    }

    fn contains_message(&self, message: &Message) -> bool {
        self.messages.iter().any(|m| m.id() == message.id())
    }
}

impl TryFrom<PersistedSessionData> for Session {
    type Error = SessionDomainError;

    fn try_from(data: PersistedSessionData) -> Result<Self, Self::Error> {
        Self::from_persisted(data)
    }
}
