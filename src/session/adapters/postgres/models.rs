//! Diesel row models for session persistence and their domain conversions.

use super::schema::sessions;
use crate::session::{
    domain::{Message, PersistedSessionData, Session, SessionId, Version},
    ports::store::{SessionStoreError, SessionStoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for session records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    /// Session identifier.
    pub id: String,
    /// Messages JSON array.
    pub messages: Value,
    /// Redundant message count.
    pub message_count: i32,
    /// Archive flag.
    pub is_archived: bool,
    /// Version token.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSessionRow {
    /// Session identifier.
    pub id: String,
    /// Messages JSON array.
    pub messages: Value,
    /// Redundant message count.
    pub message_count: i32,
    /// Archive flag.
    pub is_archived: bool,
    /// Version token.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied by a conditional write.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sessions)]
pub struct SessionChanges {
    /// Messages JSON array.
    pub messages: Value,
    /// Redundant message count.
    pub message_count: i32,
    /// Archive flag.
    pub is_archived: bool,
    /// Version assigned by this write.
    pub version: i64,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Converts a domain session into an insert row.
pub fn to_new_row(session: &Session) -> SessionStoreResult<NewSessionRow> {
    Ok(NewSessionRow {
        id: session.id().as_str().to_owned(),
        messages: messages_to_value(session.messages())?,
        message_count: count_to_column(session.message_count())?,
        is_archived: session.is_archived(),
        version: version_to_column(session.version())?,
        created_at: session.created_at(),
        updated_at: session.updated_at(),
    })
}

/// Converts the next state of a session into the changeset that installs it
/// at `version`.
pub fn to_changes(session: &Session, version: Version) -> SessionStoreResult<SessionChanges> {
    Ok(SessionChanges {
        messages: messages_to_value(session.messages())?,
        message_count: count_to_column(session.message_count())?,
        is_archived: session.is_archived(),
        version: version_to_column(version)?,
        updated_at: session.updated_at(),
    })
}

/// Converts a database row to a domain session.
pub fn row_to_session(row: SessionRow) -> SessionStoreResult<Session> {
    let SessionRow {
        id,
        messages: persisted_messages,
        message_count,
        is_archived,
        version,
        created_at,
        updated_at,
    } = row;

    let messages = serde_json::from_value::<Vec<Message>>(persisted_messages)
        .map_err(SessionStoreError::corrupt_record)?;
    let data = PersistedSessionData {
        id: SessionId::new(id).map_err(SessionStoreError::corrupt_record)?,
        messages,
        message_count: usize::try_from(message_count).map_err(SessionStoreError::corrupt_record)?,
        created_at,
        updated_at,
        is_archived,
        version: Version::new(u64::try_from(version).map_err(SessionStoreError::corrupt_record)?),
    };
    Session::from_persisted(data).map_err(SessionStoreError::corrupt_record)
}

/// Converts a version into its column value.
pub fn version_to_column(version: Version) -> SessionStoreResult<i64> {
    i64::try_from(version.value()).map_err(SessionStoreError::persistence)
}

fn count_to_column(count: usize) -> SessionStoreResult<i32> {
    i32::try_from(count).map_err(SessionStoreError::persistence)
}

fn messages_to_value(messages: &[Message]) -> SessionStoreResult<Value> {
    serde_json::to_value(messages).map_err(SessionStoreError::persistence)
}
