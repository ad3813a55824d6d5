//! `PostgreSQL` adapters for session persistence.
//!
//! The table definition lives in
//! `migrations/2026-10-01-000000_create_sessions/up.sql`.

pub(crate) mod models;
mod schema;
mod store;

pub use store::{PostgresSessionStore, SessionPgPool};
