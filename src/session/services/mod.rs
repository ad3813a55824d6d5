//! Application services for bounded sessions.

pub mod dispatch;
mod error;
mod manager;

pub use dispatch::AlertDispatcher;
pub use error::{ErrorKind, SessionManagerError, SessionManagerResult};
pub use manager::SessionManager;
