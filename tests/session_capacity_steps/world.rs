//! Shared world state for session capacity BDD scenarios.

use std::sync::Arc;

use colloquy::session::{
    adapters::memory::{InMemorySessionStore, RecordingAlertSink},
    config::SessionConfig,
    domain::Session,
    services::{AlertDispatcher, SessionManager, SessionManagerError},
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::task::JoinHandle;

/// Manager type used by the BDD world.
pub type TestSessionManager = SessionManager<InMemorySessionStore, DefaultClock>;

/// Scenario world for session capacity behaviour tests.
#[derive(Default)]
pub struct SessionCapacityWorld {
    pub store: InMemorySessionStore,
    pub sink: RecordingAlertSink,
    pub manager: Option<TestSessionManager>,
    pub alert_worker: Option<JoinHandle<()>>,
    pub last_append: Option<Result<Session, SessionManagerError>>,
}

impl SessionCapacityWorld {
    /// Wires a manager over the world's store using `config`.
    ///
    /// Must run inside the scenario's Tokio runtime.
    pub fn install_manager(&mut self, config: &SessionConfig) -> Result<(), eyre::Report> {
        let (alerts, worker) = AlertDispatcher::from_config(Arc::new(self.sink.clone()), config)?;
        let manager = SessionManager::from_config(
            Arc::new(self.store.clone()),
            Arc::new(DefaultClock),
            alerts,
            config,
        )?;
        self.manager = Some(manager);
        self.alert_worker = Some(worker);
        Ok(())
    }

    /// Returns the installed manager.
    pub fn manager(&self) -> Result<&TestSessionManager, eyre::Report> {
        self.manager
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing session manager in scenario world"))
    }

    /// Stops the manager and waits for queued alerts to be delivered.
    pub fn drain_alerts(&mut self) -> Result<(), eyre::Report> {
        drop(self.manager.take());
        if let Some(worker) = self.alert_worker.take() {
            run_async(worker)?;
        }
        Ok(())
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SessionCapacityWorld {
    SessionCapacityWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
