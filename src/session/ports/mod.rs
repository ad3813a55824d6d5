//! Port trait definitions for the session subsystem.
//!
//! Ports define the interfaces the session manager needs from
//! infrastructure: a versioned record store and an alert sink.

pub mod alert;
pub mod store;

pub use alert::{AlertSink, AlertSinkError, AlertSinkResult};
pub use store::{SessionStore, SessionStoreError, SessionStoreResult};
