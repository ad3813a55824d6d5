//! Errors returned by the session manager.
//!
//! Each variant names one failure kind so callers can decide between
//! retrying, surfacing the problem to a user, or starting a new session.

use crate::session::{
    domain::{MessageId, SessionDomainError, SessionId, Version},
    ports::store::SessionStoreError,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for session manager operations.
pub type SessionManagerResult<T> = Result<T, SessionManagerError>;

/// Classification of [`SessionManagerError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The session id is unknown.
    NotFound,
    /// The session is closed to mutation.
    Archived,
    /// The session reached its ceiling.
    LimitExceeded,
    /// The message was already appended.
    DuplicateMessage,
    /// A concurrent writer won the race for this version.
    ConcurrentModification,
    /// The store did not answer in time.
    StorageTimeout,
    /// The store failed.
    StorageUnavailable,
    /// The stored session is invalid.
    CorruptRecord,
}

/// Failures of session manager operations.
#[derive(Debug, Clone, Error)]
pub enum SessionManagerError {
    /// No session exists for the id.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The session is archived and accepts no further messages.
    #[error("session {0} is archived and accepts no new messages")]
    Archived(SessionId),

    /// The session already holds the configured maximum of messages.
    ///
    /// Callers should archive the session and start a new one.
    #[error("session {session_id} reached its limit of {max_messages} messages")]
    LimitExceeded {
        /// The full session.
        session_id: SessionId,
        /// The configured ceiling.
        max_messages: usize,
    },

    /// The message id is already present in the session.
    #[error("message {message_id} is already part of session {session_id}")]
    DuplicateMessage {
        /// The session that already holds the message.
        session_id: SessionId,
        /// The repeated message id.
        message_id: MessageId,
    },

    /// Another writer updated the session after it was loaded.
    #[error("session {session_id} changed since {expected} was loaded; reload and retry")]
    ConcurrentModification {
        /// The contested session.
        session_id: SessionId,
        /// The version this writer observed.
        expected: Version,
    },

    /// A store round-trip exceeded the configured timeout.
    #[error("session store did not respond within {timeout:?}")]
    StorageTimeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The store reported an infrastructure failure.
    #[error("session store unavailable: {0}")]
    StorageUnavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The stored session failed its integrity checks.
    ///
    /// The record needs repair before the session can be used again.
    #[error("stored session is corrupt: {0}")]
    CorruptRecord(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionManagerError {
    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Archived(_) => ErrorKind::Archived,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::DuplicateMessage { .. } => ErrorKind::DuplicateMessage,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::StorageTimeout { .. } => ErrorKind::StorageTimeout,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::CorruptRecord(_) => ErrorKind::CorruptRecord,
        }
    }

    /// Returns `true` when a retry after a fresh load may succeed.
    ///
    /// Not-found, archived, limit, duplicate and corrupt-record failures
    /// describe durable facts about the session and are never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConcurrentModification
                | ErrorKind::StorageTimeout
                | ErrorKind::StorageUnavailable
        )
    }

    /// Wraps an infrastructure failure.
    pub fn storage_unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::StorageUnavailable(Arc::new(err))
    }

    /// Wraps an integrity failure of a stored session.
    pub fn corrupt_record(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::CorruptRecord(Arc::new(err))
    }

    /// Maps a rejected domain transition on `session_id`.
    #[must_use]
    pub fn from_domain(session_id: &SessionId, err: SessionDomainError) -> Self {
        match err {
            SessionDomainError::Archived => Self::Archived(session_id.clone()),
            SessionDomainError::CapacityReached { max_messages } => Self::LimitExceeded {
                session_id: session_id.clone(),
                max_messages,
            },
            SessionDomainError::DuplicateMessage(message_id) => Self::DuplicateMessage {
                session_id: session_id.clone(),
                message_id,
            },
            SessionDomainError::InvalidSessionId(_) | SessionDomainError::CountMismatch { .. } => {
                Self::corrupt_record(err)
            }
        }
    }
}

impl From<SessionStoreError> for SessionManagerError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(session_id) => Self::NotFound(session_id),
            SessionStoreError::VersionConflict {
                session_id,
                expected,
            } => Self::ConcurrentModification {
                session_id,
                expected,
            },
            SessionStoreError::Persistence(source) => Self::StorageUnavailable(source),
            SessionStoreError::CorruptRecord(source) => Self::CorruptRecord(source),
            SessionStoreError::Duplicate(_) => Self::storage_unavailable(err),
        }
    }
}
