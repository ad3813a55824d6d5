//! In-memory implementation of the `SessionStore` port.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::session::{
    domain::{Session, SessionId, Version},
    ports::store::{SessionStore, SessionStoreError, SessionStoreResult},
};

/// In-memory implementation of [`SessionStore`].
///
/// Sessions live in a sharded [`DashMap`], so a compare-and-save only locks
/// the shard holding its own key and finishes before returning. Suitable for
/// tests and single-process deployments.
///
/// # Example
///
/// ```
/// use colloquy::session::adapters::memory::InMemorySessionStore;
///
/// let store = InMemorySessionStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<SessionId, Session>>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns how many compare-and-save calls have landed.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> SessionStoreResult<()> {
        match self.sessions.entry(session.id().clone()) {
            Entry::Occupied(_) => Err(SessionStoreError::Duplicate(session.id().clone())),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn load(&self, id: &SessionId) -> SessionStoreResult<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.value().clone()))
    }

    async fn compare_and_save(
        &self,
        expected: Version,
        next: &Session,
    ) -> SessionStoreResult<Session> {
        let Some(mut entry) = self.sessions.get_mut(next.id()) else {
            return Err(SessionStoreError::NotFound(next.id().clone()));
        };

        if entry.version() != expected {
            return Err(SessionStoreError::VersionConflict {
                session_id: next.id().clone(),
                expected,
            });
        }

        let stored = next.clone().with_version(expected.next());
        *entry = stored.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }
}
