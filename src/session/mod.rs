//! Capacity-bounded session store.
//!
//! A session is an append-only message log with a hard ceiling on its
//! length. The [`services::SessionManager`] appends messages, archives
//! sessions and raises early-warning alerts as a session nears its ceiling.
//!
//! # Architecture
//!
//! - **Domain**: [`domain::Session`], [`domain::Message`], [`domain::SessionLimits`]
//! - **Ports**: [`ports::store::SessionStore`], [`ports::alert::AlertSink`]
//! - **Adapters**: in-memory, `PostgreSQL` and `tracing` implementations
//! - **Services**: [`services::SessionManager`] and [`services::AlertDispatcher`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use colloquy::session::adapters::memory::{InMemorySessionStore, RecordingAlertSink};
//! use colloquy::session::domain::{Message, Role, Session, SessionId, SessionLimits};
//! use colloquy::session::ports::store::SessionStore;
//! use colloquy::session::services::{AlertDispatcher, SessionManager};
//! use mockable::DefaultClock;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemorySessionStore::new());
//! let sink = Arc::new(RecordingAlertSink::new());
//! let (alerts, _worker) = AlertDispatcher::spawn(sink, 16, Duration::from_secs(1));
//! let manager = SessionManager::new(
//!     Arc::clone(&store),
//!     Arc::new(DefaultClock),
//!     SessionLimits::default(),
//!     alerts,
//! );
//!
//! let id = SessionId::new("support-42").expect("valid id");
//! store.create(&Session::new(id.clone(), &DefaultClock)).await.expect("created");
//!
//! let message = Message::new(Role::Originator, "Hello", &DefaultClock);
//! let session = manager.append_message(&id, message).await.expect("appended");
//! assert_eq!(session.message_count(), 1);
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
