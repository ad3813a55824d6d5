//! The bounded session manager.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tracing::{debug, info, warn};

use super::{
    dispatch::AlertDispatcher,
    error::{SessionManagerError, SessionManagerResult},
};
use crate::session::{
    config::{ConfigError, DEFAULT_STORE_TIMEOUT, SessionConfig},
    domain::{Message, Session, SessionId, SessionLimits, ThresholdAlert},
    ports::store::{SessionStore, SessionStoreResult},
};

/// Owns the append, limit, alert and archive policy for sessions.
///
/// The manager keeps no session state between calls. Races between writers of
/// the same session are settled by the store's conditional write: the loser
/// gets [`SessionManagerError::ConcurrentModification`] and may reload and
/// retry. The manager itself never retries.
pub struct SessionManager<S, C>
where
    S: SessionStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    limits: SessionLimits,
    alerts: AlertDispatcher,
    store_timeout: Duration,
}

impl<S, C> Clone for SessionManager<S, C>
where
    S: SessionStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            limits: self.limits,
            alerts: self.alerts.clone(),
            store_timeout: self.store_timeout,
        }
    }
}

impl<S, C> SessionManager<S, C>
where
    S: SessionStore,
    C: Clock + Send + Sync,
{
    /// Creates a manager with the default store timeout.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        clock: Arc<C>,
        limits: SessionLimits,
        alerts: AlertDispatcher,
    ) -> Self {
        Self {
            store,
            clock,
            limits,
            alerts,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Creates a manager from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Limits`] when the configured limits are invalid,
    /// or [`ConfigError::MustBePositive`] when a configured bound is zero.
    pub fn from_config(
        store: Arc<S>,
        clock: Arc<C>,
        alerts: AlertDispatcher,
        config: &SessionConfig,
    ) -> Result<Self, ConfigError> {
        let limits = config.validate()?;
        Ok(Self::new(store, clock, limits, alerts).with_store_timeout(config.store_timeout()))
    }

    /// Sets the bound applied to each store round-trip.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Returns a manager sharing this one's store, clock and alert queue but
    /// bounding store round-trips by `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.clone().with_store_timeout(timeout)
    }

    /// Returns the limits enforced by this manager.
    #[must_use]
    pub const fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    /// Returns the bound applied to each store round-trip.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    /// Loads a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionManagerError::NotFound`] when the session does not
    /// exist, or a storage error when the store fails or times out.
    #[tracing::instrument(skip_all, fields(session_id = %id))]
    pub async fn get_session(&self, id: &SessionId) -> SessionManagerResult<Session> {
        self.load_existing(id).await
    }

    /// Appends a message to a session.
    ///
    /// Preconditions are checked in order: the session exists, it is not
    /// archived, it is below its ceiling, and the message id is new to it.
    /// The write only lands if nobody else wrote the session since it was
    /// loaded. After a successful write a threshold alert may be queued; alert
    /// delivery never affects the result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionManagerError::NotFound`],
    /// [`SessionManagerError::Archived`],
    /// [`SessionManagerError::LimitExceeded`],
    /// [`SessionManagerError::DuplicateMessage`],
    /// [`SessionManagerError::ConcurrentModification`],
    /// [`SessionManagerError::StorageTimeout`],
    /// [`SessionManagerError::StorageUnavailable`] or
    /// [`SessionManagerError::CorruptRecord`].
    #[tracing::instrument(skip_all, fields(session_id = %id, message_id = %message.id()))]
    pub async fn append_message(
        &self,
        id: &SessionId,
        message: Message,
    ) -> SessionManagerResult<Session> {
        let current = self.load_existing(id).await?;
        let previous_count = current.message_count();

        let mut next = current.clone();
        if let Err(err) = next.append(message, &self.limits, &*self.clock) {
            let rejection = SessionManagerError::from_domain(id, err);
            warn!(error = %rejection, "append rejected");
            return Err(rejection);
        }

        let stored = self.save(&current, &next).await?;
        debug!(
            message_count = stored.message_count(),
            version = %stored.version(),
            "message appended"
        );

        self.raise_alert_if_due(previous_count, &stored);
        Ok(stored)
    }

    /// Closes a session to further appends.
    ///
    /// Archiving an archived session returns it unchanged without writing.
    ///
    /// # Errors
    ///
    /// Returns [`SessionManagerError::NotFound`],
    /// [`SessionManagerError::ConcurrentModification`] or a storage error.
    #[tracing::instrument(skip_all, fields(session_id = %id))]
    pub async fn archive_session(&self, id: &SessionId) -> SessionManagerResult<Session> {
        let current = self.load_existing(id).await?;

        let mut next = current.clone();
        if !next.archive(&*self.clock) {
            debug!("session already archived");
            return Ok(current);
        }

        let stored = self.save(&current, &next).await?;
        info!(
            message_count = stored.message_count(),
            version = %stored.version(),
            "session archived"
        );
        Ok(stored)
    }

    async fn load_existing(&self, id: &SessionId) -> SessionManagerResult<Session> {
        self.bounded(self.store.load(id))
            .await?
            .ok_or_else(|| SessionManagerError::NotFound(id.clone()))
    }

    async fn save(&self, current: &Session, next: &Session) -> SessionManagerResult<Session> {
        self.bounded(self.store.compare_and_save(current.version(), next))
            .await
            .inspect_err(|err| {
                if let SessionManagerError::ConcurrentModification { expected, .. } = err {
                    warn!(expected = %expected, "conditional write lost a race");
                }
            })
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = SessionStoreResult<T>>,
    ) -> SessionManagerResult<T> {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(timeout = ?self.store_timeout, "session store round-trip timed out");
                Err(SessionManagerError::StorageTimeout {
                    timeout: self.store_timeout,
                })
            }
        }
    }

    fn raise_alert_if_due(&self, previous_count: usize, stored: &Session) {
        if !self.limits.alert_due(previous_count, stored.message_count()) {
            return;
        }

        let alert = ThresholdAlert::new(
            stored.id().clone(),
            stored.message_count(),
            self.limits.max_messages(),
            &*self.clock,
        );
        if self.alerts.dispatch(alert) {
            debug!(
                message_count = stored.message_count(),
                max_messages = self.limits.max_messages(),
                "threshold alert queued"
            );
        }
    }
}
