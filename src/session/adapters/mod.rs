//! Adapters for the session module.
//!
//! Concrete implementations of the [`SessionStore`] and [`AlertSink`] ports.
//!
//! # Available Adapters
//!
//! - [`memory::InMemorySessionStore`]: sharded in-memory store
//! - [`memory::RecordingAlertSink`]: captures alerts for inspection
//! - [`postgres::PostgresSessionStore`]: `PostgreSQL` persistence using Diesel
//! - [`tracing_alert::TracingAlertSink`]: forwards alerts to `tracing`
//!
//! [`SessionStore`]: crate::session::ports::store::SessionStore
//! [`AlertSink`]: crate::session::ports::alert::AlertSink

pub mod memory;
pub mod postgres;
pub mod tracing_alert;
