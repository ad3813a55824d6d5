//! Port for delivering threshold alerts to an external sink.

use crate::session::domain::ThresholdAlert;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for alert sink operations.
pub type AlertSinkResult<T> = Result<T, AlertSinkError>;

/// Receiver of threshold alerts.
///
/// Delivery guarantees and retries are the sink's concern. The session manager
/// never waits on a sink; alerts reach it through
/// [`AlertDispatcher`](crate::session::services::AlertDispatcher).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// Returns [`AlertSinkError`] when the alert could not be delivered.
    async fn send(&self, alert: &ThresholdAlert) -> AlertSinkResult<()>;
}

/// Errors returned by alert sinks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlertSinkError {
    /// The sink rejected or failed to deliver the alert.
    #[error("alert delivery failed: {0}")]
    Delivery(String),

    /// The sink cannot be reached.
    #[error("alert sink unavailable: {0}")]
    Unavailable(String),
}

impl AlertSinkError {
    /// Creates a delivery error.
    #[must_use]
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
