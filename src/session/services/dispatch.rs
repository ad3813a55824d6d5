//! Fire-and-forget delivery of threshold alerts.
//!
//! The session manager hands alerts to an [`AlertDispatcher`], which queues
//! them on a bounded `mpsc` channel. A background task drains the queue into
//! an [`AlertSink`]. Neither a slow nor a failing sink can hold up or fail the
//! append that raised the alert: a full queue drops the alert, and sink
//! failures are logged.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::{
    config::{ConfigError, SessionConfig},
    domain::ThresholdAlert,
    ports::alert::AlertSink,
};

/// Default capacity of the alert queue.
pub const DEFAULT_ALERT_BUFFER: usize = 256;

/// Default bound on a single sink delivery.
pub const DEFAULT_ALERT_SINK_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle for queuing alerts to a background delivery task.
///
/// Cloning the handle shares the queue. The delivery task exits once every
/// handle has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    sender: mpsc::Sender<ThresholdAlert>,
}

impl AlertDispatcher {
    /// Starts the delivery task for `sink` and returns the queue handle with
    /// the task's join handle.
    ///
    /// `buffer` is clamped to at least one slot. Each delivery is abandoned
    /// after `sink_timeout`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn<S>(sink: Arc<S>, buffer: usize, sink_timeout: Duration) -> (Self, JoinHandle<()>)
    where
        S: AlertSink + ?Sized + 'static,
    {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let worker = tokio::spawn(deliver_alerts(sink, receiver, sink_timeout));
        (Self { sender }, worker)
    }

    /// Starts the delivery task with the queue size and delivery bound taken
    /// from `config`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MustBePositive`] when `alert_buffer` or
    /// `alert_sink_timeout_ms` is zero.
    pub fn from_config<S>(
        sink: Arc<S>,
        config: &SessionConfig,
    ) -> Result<(Self, JoinHandle<()>), ConfigError>
    where
        S: AlertSink + ?Sized + 'static,
    {
        config.validate_alerting()?;
        Ok(Self::spawn(
            sink,
            config.alert_buffer,
            config.alert_sink_timeout(),
        ))
    }

    /// Queues an alert without waiting.
    ///
    /// Returns `false` when the alert was dropped because the queue is full
    /// or the delivery task has stopped.
    pub fn dispatch(&self, alert: ThresholdAlert) -> bool {
        match self.sender.try_send(alert) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    session_id = %dropped.session_id(),
                    message_count = dropped.message_count(),
                    "alert queue full; dropping threshold alert"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(
                    session_id = %dropped.session_id(),
                    "alert delivery task stopped; dropping threshold alert"
                );
                false
            }
        }
    }
}

async fn deliver_alerts<S>(
    sink: Arc<S>,
    mut receiver: mpsc::Receiver<ThresholdAlert>,
    sink_timeout: Duration,
) where
    S: AlertSink + ?Sized,
{
    while let Some(alert) = receiver.recv().await {
        match tokio::time::timeout(sink_timeout, sink.send(&alert)).await {
            Ok(Ok(())) => {
                debug!(session_id = %alert.session_id(), "threshold alert delivered");
            }
            Ok(Err(err)) => {
                warn!(session_id = %alert.session_id(), error = %err, "threshold alert delivery failed");
            }
            Err(_) => {
                warn!(
                    session_id = %alert.session_id(),
                    timeout = ?sink_timeout,
                    "threshold alert delivery timed out"
                );
            }
        }
    }
    debug!("alert queue closed; delivery task exiting");
}
