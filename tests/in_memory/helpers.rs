//! Shared test helpers for in-memory session integration tests.

use std::sync::Arc;
use std::time::Duration;

use colloquy::session::{
    adapters::memory::{InMemorySessionStore, RecordingAlertSink},
    domain::{AlertPolicy, Message, Role, Session, SessionId, SessionLimits},
    ports::store::SessionStore,
    services::{AlertDispatcher, SessionManager},
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Manager type used across the in-memory suites.
pub type TestManager = SessionManager<InMemorySessionStore, DefaultClock>;

/// Boxed error used by fallible helpers.
pub type TestError = Box<dyn std::error::Error + Send + Sync>;

/// Routes `tracing` output to the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    let _already_installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Provides a fresh in-memory store for each test.
#[fixture]
pub fn store() -> InMemorySessionStore {
    InMemorySessionStore::new()
}

/// Provides a sink that records delivered alerts.
#[fixture]
pub fn sink() -> RecordingAlertSink {
    RecordingAlertSink::new()
}

/// Provides a fresh session id.
#[fixture]
pub fn session_id() -> SessionId {
    SessionId::generate()
}

/// Builds a manager over `store` whose alerts go to `sink`.
pub fn manager_for(
    store: &InMemorySessionStore,
    sink: &RecordingAlertSink,
    limits: SessionLimits,
) -> (TestManager, JoinHandle<()>) {
    init_tracing();
    let (alerts, worker) =
        AlertDispatcher::spawn(Arc::new(sink.clone()), 64, Duration::from_secs(1));
    let manager = SessionManager::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
        limits,
        alerts,
    );
    (manager, worker)
}

/// Limits with a small ceiling and a 90% threshold.
///
/// # Errors
///
/// Returns an error if the ceiling is zero.
pub fn small_limits(max_messages: usize) -> Result<SessionLimits, TestError> {
    Ok(SessionLimits::try_new(
        max_messages,
        0.9,
        AlertPolicy::EveryAppend,
    )?)
}

/// Creates a session in `store` already holding `count` messages.
///
/// # Errors
///
/// Returns an error if seeding or storing the session fails.
pub async fn seed_session(
    store: &InMemorySessionStore,
    id: &SessionId,
    count: usize,
) -> Result<Session, TestError> {
    let clock = DefaultClock;
    let roomy = SessionLimits::try_new(count.max(1), 1.0, AlertPolicy::EveryAppend)?;
    let mut session = Session::new(id.clone(), &clock);
    for index in 0..count {
        session.append(
            Message::new(Role::Originator, format!("seed {index}"), &clock),
            &roomy,
            &clock,
        )?;
    }
    store.create(&session).await?;
    Ok(session)
}

/// Builds an originator message with `content`.
pub fn originator(content: &str) -> Message {
    Message::new(Role::Originator, content, &DefaultClock)
}

/// Drops the manager and waits for every queued alert to be delivered.
///
/// # Errors
///
/// Returns an error if the alert worker panicked.
pub async fn drain(manager: TestManager, worker: JoinHandle<()>) -> Result<(), TestError> {
    drop(manager);
    worker.await?;
    Ok(())
}
