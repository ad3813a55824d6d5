//! Alert sink that keeps delivered alerts in memory.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::session::{
    domain::ThresholdAlert,
    ports::alert::{AlertSink, AlertSinkError, AlertSinkResult},
};

/// In-memory [`AlertSink`] that records every alert it receives.
///
/// A sink built with [`RecordingAlertSink::failing`] still records each
/// attempt but reports the configured error, which is how tests model an
/// unreachable alerting backend.
#[derive(Debug, Default, Clone)]
pub struct RecordingAlertSink {
    received: Arc<Mutex<Vec<ThresholdAlert>>>,
    failure: Option<AlertSinkError>,
}

impl RecordingAlertSink {
    /// Creates a sink that accepts every alert.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that records attempts and fails each one with `error`.
    #[must_use]
    pub fn failing(error: AlertSinkError) -> Self {
        Self {
            received: Arc::default(),
            failure: Some(error),
        }
    }

    /// Returns a snapshot of the alerts received so far.
    #[must_use]
    pub fn alerts(&self) -> Vec<ThresholdAlert> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of alerts received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no alert has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    async fn send(&self, alert: &ThresholdAlert) -> AlertSinkResult<()> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert.clone());

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
