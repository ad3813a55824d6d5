//! Domain types for bounded sessions.
//!
//! Pure types with no infrastructure dependencies. Every transition that
//! changes a session's message log goes through [`Session`], which keeps the
//! redundant message count in step with the log itself.

mod alert;
mod error;
mod ids;
mod limits;
mod message;
mod session;

pub use alert::{AlertSeverity, ThresholdAlert};
pub use error::{ParseRoleError, SessionDomainError};
pub use ids::{MessageId, SessionId, Version};
pub use limits::{
    AlertPolicy, DEFAULT_ALERT_THRESHOLD_RATIO, DEFAULT_MAX_MESSAGES, LimitsError, SessionLimits,
};
pub use message::{Message, Role};
pub use session::{PersistedSessionData, Session};
