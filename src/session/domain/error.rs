//! Error types for session domain validation and transitions.

use super::MessageId;
use thiserror::Error;

/// Errors returned by session domain constructors and transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionDomainError {
    /// The session identifier is empty after trimming.
    #[error("invalid session id '{0}', expected a non-empty value")]
    InvalidSessionId(String),

    /// The session is archived and closed to appends.
    #[error("session is archived")]
    Archived,

    /// The session already holds the maximum number of messages.
    #[error("session has reached its ceiling of {max_messages} messages")]
    CapacityReached {
        /// The configured ceiling.
        max_messages: usize,
    },

    /// A message with this identifier is already part of the session.
    #[error("duplicate message id: {0}")]
    DuplicateMessage(MessageId),

    /// Persisted data carries a message count that disagrees with its messages.
    #[error("recorded message count {recorded} does not match {actual} stored messages")]
    CountMismatch {
        /// The stored count.
        recorded: usize,
        /// The actual number of messages.
        actual: usize,
    },
}

/// Error returned while parsing a message role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown message role: {0}")]
pub struct ParseRoleError(pub String);
