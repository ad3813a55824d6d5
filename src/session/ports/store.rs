//! Store port for session persistence.
//!
//! A narrow interface over an external durable store. It carries no business
//! rules: callers decide what the next state is, the store only guarantees
//! that a write lands atomically and only against the version the caller
//! observed.

use crate::session::domain::{Session, SessionId, Version};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for session store operations.
pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// Port for versioned session persistence.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `compare_and_save` is atomic: the write either lands in full or not at
///   all, including when the calling future is dropped mid-flight
/// - a successful write assigns `expected.next()` as the stored version
/// - writes to different session ids do not wait on each other
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a newly provisioned session.
    ///
    /// Session provisioning lives outside the session manager; this method
    /// serves that collaborator and test setup.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Duplicate`] when the id is already taken,
    /// or [`SessionStoreError::Persistence`] when the backend fails.
    async fn create(&self, session: &Session) -> SessionStoreResult<()>;

    /// Loads the current state of a session.
    ///
    /// Returns `None` when no session exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Persistence`] when the backend fails, or
    /// [`SessionStoreError::CorruptRecord`] when the stored row is invalid.
    async fn load(&self, id: &SessionId) -> SessionStoreResult<Option<Session>>;

    /// Replaces the stored session with `next` if its version still equals
    /// `expected`.
    ///
    /// Returns the stored session carrying its new version.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::VersionConflict`] when another write
    /// landed first, [`SessionStoreError::NotFound`] when the session does not
    /// exist, or [`SessionStoreError::Persistence`] when the backend fails.
    async fn compare_and_save(
        &self,
        expected: Version,
        next: &Session,
    ) -> SessionStoreResult<Session>;
}

/// Errors returned by session store implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    /// No session exists for the id.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// A session with this id already exists.
    #[error("duplicate session: {0}")]
    Duplicate(SessionId),

    /// The stored version no longer matches the expected one.
    #[error("version conflict on session {session_id}: expected {expected}")]
    VersionConflict {
        /// The contested session.
        session_id: SessionId,
        /// The version the writer observed.
        expected: Version,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),

    /// A stored record could not be decoded into a valid session.
    ///
    /// Reloading returns the same record, so retrying cannot help.
    #[error("corrupt session record: {0}")]
    CorruptRecord(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a decoding failure for a stored record.
    pub fn corrupt_record(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::CorruptRecord(Arc::new(err))
    }
}
