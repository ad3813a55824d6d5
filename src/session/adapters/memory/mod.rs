//! In-memory adapter implementations.
//!
//! These adapters provide thread-safe implementations suitable for unit and
//! integration testing without database dependencies.

mod alert;
mod store;

pub use alert::RecordingAlertSink;
pub use store::InMemorySessionStore;
