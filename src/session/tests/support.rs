//! Shared fixtures and store wrappers for session unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::DefaultClock;
use tokio::sync::Barrier;
use tokio::task::JoinHandle;

use crate::session::{
    adapters::memory::InMemorySessionStore,
    domain::{
        AlertPolicy, Message, Role, Session, SessionDomainError, SessionId, SessionLimits, Version,
    },
    ports::{
        alert::AlertSink,
        store::{SessionStore, SessionStoreError, SessionStoreResult},
    },
    services::{AlertDispatcher, SessionManager},
};

/// Builds a session holding `count` messages, bypassing the manager.
pub fn session_with_messages(id: &SessionId, count: usize) -> Session {
    let clock = DefaultClock;
    let roomy =
        SessionLimits::try_new(count.max(1), 1.0, AlertPolicy::EveryAppend).expect("valid limits");
    let mut session = Session::new(id.clone(), &clock);
    let roles = [Role::Originator, Role::Assistant].into_iter().cycle();
    for (index, role) in (0..count).zip(roles) {
        session
            .append(Message::new(role, format!("message {index}"), &clock), &roomy, &clock)
            .expect("seed append should succeed");
    }
    session
}

/// Creates `session` in `store`.
pub async fn seed<S: SessionStore>(store: &S, session: &Session) {
    store.create(session).await.expect("seed create should succeed");
}

/// A manager wired to a store and an alert sink, plus the alert worker.
pub struct Harness<S: SessionStore> {
    pub manager: SessionManager<S, DefaultClock>,
    pub worker: JoinHandle<()>,
}

impl<S: SessionStore> Harness<S> {
    /// Wires a manager around `store` and `sink`.
    pub fn new<A: AlertSink + 'static>(store: Arc<S>, sink: Arc<A>, limits: SessionLimits) -> Self {
        let (alerts, worker) = AlertDispatcher::spawn(sink, 16, Duration::from_secs(1));
        let manager = SessionManager::new(store, Arc::new(DefaultClock), limits, alerts);
        Self { manager, worker }
    }

    /// Drops the manager and waits until every queued alert was delivered.
    pub async fn drain_alerts(self) {
        let Self { manager, worker } = self;
        drop(manager);
        worker.await.expect("alert worker should exit cleanly");
    }
}

/// Store wrapper whose loads wait until `parties` loads are in flight.
///
/// Lets two appends observe the same version before either writes.
pub struct BarrierStore {
    pub inner: InMemorySessionStore,
    barrier: Barrier,
}

impl BarrierStore {
    pub fn new(inner: InMemorySessionStore, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl SessionStore for BarrierStore {
    async fn create(&self, session: &Session) -> SessionStoreResult<()> {
        self.inner.create(session).await
    }

    async fn load(&self, id: &SessionId) -> SessionStoreResult<Option<Session>> {
        let loaded = self.inner.load(id).await;
        self.barrier.wait().await;
        loaded
    }

    async fn compare_and_save(
        &self,
        expected: Version,
        next: &Session,
    ) -> SessionStoreResult<Session> {
        self.inner.compare_and_save(expected, next).await
    }
}

/// Store wrapper that delays loads and writes.
pub struct SlowStore {
    pub inner: InMemorySessionStore,
    pub load_delay: Duration,
    pub save_delay: Duration,
}

#[async_trait]
impl SessionStore for SlowStore {
    async fn create(&self, session: &Session) -> SessionStoreResult<()> {
        self.inner.create(session).await
    }

    async fn load(&self, id: &SessionId) -> SessionStoreResult<Option<Session>> {
        tokio::time::sleep(self.load_delay).await;
        self.inner.load(id).await
    }

    async fn compare_and_save(
        &self,
        expected: Version,
        next: &Session,
    ) -> SessionStoreResult<Session> {
        tokio::time::sleep(self.save_delay).await;
        self.inner.compare_and_save(expected, next).await
    }
}

/// Store wrapper whose writes always fail with a persistence error.
pub struct FailingSaveStore {
    pub inner: InMemorySessionStore,
}

#[async_trait]
impl SessionStore for FailingSaveStore {
    async fn create(&self, session: &Session) -> SessionStoreResult<()> {
        self.inner.create(session).await
    }

    async fn load(&self, id: &SessionId) -> SessionStoreResult<Option<Session>> {
        self.inner.load(id).await
    }

    async fn compare_and_save(
        &self,
        _expected: Version,
        _next: &Session,
    ) -> SessionStoreResult<Session> {
        Err(SessionStoreError::persistence(std::io::Error::other(
            "connection reset by peer",
        )))
    }
}

/// Store whose loads find a record with a drifted message count.
pub struct CorruptLoadStore;

#[async_trait]
impl SessionStore for CorruptLoadStore {
    async fn create(&self, _session: &Session) -> SessionStoreResult<()> {
        Ok(())
    }

    async fn load(&self, _id: &SessionId) -> SessionStoreResult<Option<Session>> {
        Err(SessionStoreError::corrupt_record(
            SessionDomainError::CountMismatch {
                recorded: 4,
                actual: 3,
            },
        ))
    }

    async fn compare_and_save(
        &self,
        expected: Version,
        next: &Session,
    ) -> SessionStoreResult<Session> {
        Err(SessionStoreError::VersionConflict {
            session_id: next.id().clone(),
            expected,
        })
    }
}
