//! Alert sink that writes alerts to the `tracing` pipeline.

use async_trait::async_trait;
use tracing::warn;

use crate::session::{
    domain::ThresholdAlert,
    ports::alert::{AlertSink, AlertSinkResult},
};

/// [`AlertSink`] that emits each alert as a WARN-level `tracing` event.
///
/// Useful as a default when no external alerting backend is wired in; the
/// installed subscriber decides where the events go.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl TracingAlertSink {
    /// Creates the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn send(&self, alert: &ThresholdAlert) -> AlertSinkResult<()> {
        warn!(
            severity = %alert.severity(),
            session_id = %alert.session_id(),
            message_count = alert.message_count(),
            max_messages = alert.max_messages(),
            "{}",
            alert.message()
        );
        Ok(())
    }
}
