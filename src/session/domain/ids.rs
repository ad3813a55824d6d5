//! Identifier and version newtypes for bounded sessions.
//!
//! These types keep session identifiers, message identifiers and optimistic
//! concurrency tokens from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::SessionDomainError;

/// Stable identifier of a session record.
///
/// Session identifiers are opaque, non-empty strings assigned by whoever
/// provisions the session. Surrounding whitespace is trimmed on construction.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::SessionId;
///
/// let id = SessionId::new("  support-42 ").expect("non-empty id");
/// assert_eq!(id.as_str(), "support-42");
/// assert!(SessionId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session identifier from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::InvalidSessionId`] when the value is
    /// empty after trimming.
    pub fn new(value: impl AsRef<str>) -> Result<Self, SessionDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionDomainError::InvalidSessionId(
                value.as_ref().to_owned(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh identifier backed by a random UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a message within a session.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::MessageId;
///
/// let id = MessageId::new();
/// assert!(!id.as_ref().is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random message identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a message identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

/// Note: generates a new random UUID on each call. Prefer
/// `MessageId::new()` when the intent should be explicit.
impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for MessageId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optimistic concurrency token for a stored session.
///
/// Callers should only compare versions for equality. The store assigns the
/// next version on every successful write.
///
/// # Examples
///
/// ```
/// use colloquy::session::domain::Version;
///
/// let first = Version::initial();
/// assert_ne!(first, first.next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Version assigned to a freshly provisioned session.
    #[must_use]
    pub const fn initial() -> Self {
        Self(1)
    }

    /// Creates a version from a raw persisted value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw persisted value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the version that follows this one.
    ///
    /// Saturates at `u64::MAX`, which no session reaches in practice.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
