//! Diesel schema for session persistence.

diesel::table! {
    /// Bounded session records with their message log.
    sessions (id) {
        /// Session identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Messages in insertion order.
        messages -> Jsonb,
        /// Redundant message count, checked against `messages` by the table.
        message_count -> Int4,
        /// Whether the session is closed to appends.
        is_archived -> Bool,
        /// Optimistic concurrency token.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Timestamp of the last successful mutation.
        updated_at -> Timestamptz,
    }
}
