//! Colloquy: capacity-bounded conversation sessions.
//!
//! This crate stores long-lived conversational records that accept appended
//! messages up to a hard ceiling, warn as the ceiling approaches, and stay
//! consistent when several writers append to the same record at once.
//!
//! # Architecture
//!
//! Colloquy follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, alerting, etc.)
//!
//! # Modules
//!
//! - [`session`]: Bounded session records, their store and alerting policy

pub mod session;
