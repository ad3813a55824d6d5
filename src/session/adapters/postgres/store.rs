//! `PostgreSQL` implementation of the `SessionStore` port using Diesel ORM.

use super::{
    models::{SessionChanges, SessionRow, row_to_session, to_changes, to_new_row, version_to_column},
    schema::sessions,
};
use crate::session::{
    domain::{Session, SessionId, Version},
    ports::store::{SessionStore, SessionStoreError, SessionStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the session store.
pub type SessionPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed session store.
///
/// A conditional write is a single `UPDATE ... WHERE id = $1 AND version = $2
/// RETURNING *` statement, so it lands in full or not at all even when the
/// caller stops waiting for it. Row-level locking keeps writes to different
/// sessions independent.
///
/// # Example
///
/// ```ignore
/// use diesel::r2d2::{ConnectionManager, Pool};
/// use diesel::PgConnection;
/// use colloquy::session::adapters::postgres::PostgresSessionStore;
///
/// let manager = ConnectionManager::<PgConnection>::new("postgres://...");
/// let pool = Pool::builder().build(manager).expect("pool");
/// let store = PostgresSessionStore::new(pool);
/// ```
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: SessionPgPool,
}

impl PostgresSessionStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SessionPgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SessionPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> SessionStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SessionStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SessionStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SessionStoreError::persistence)?
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: &Session) -> SessionStoreResult<()> {
        let session_id = session.id().clone();
        let new_row = to_new_row(session)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(sessions::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        SessionStoreError::Duplicate(session_id.clone())
                    }
                    _ => SessionStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn load(&self, id: &SessionId) -> SessionStoreResult<Option<Session>> {
        let lookup_id = id.clone();
        self.run_blocking(move |connection| {
            let row = sessions::table
                .filter(sessions::id.eq(lookup_id.as_str()))
                .select(SessionRow::as_select())
                .first::<SessionRow>(connection)
                .optional()
                .map_err(SessionStoreError::persistence)?;
            row.map(row_to_session).transpose()
        })
        .await
    }

    async fn compare_and_save(
        &self,
        expected: Version,
        next: &Session,
    ) -> SessionStoreResult<Session> {
        let session_id = next.id().clone();
        let expected_column = version_to_column(expected)?;
        let changes: SessionChanges = to_changes(next, expected.next())?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                sessions::table
                    .filter(sessions::id.eq(session_id.as_str()))
                    .filter(sessions::version.eq(expected_column)),
            )
            .set(&changes)
            .returning(SessionRow::as_returning())
            .get_result::<SessionRow>(connection)
            .optional()
            .map_err(SessionStoreError::persistence)?;

            if let Some(row) = updated {
                return row_to_session(row);
            }

            let exists = diesel::select(diesel::dsl::exists(
                sessions::table.filter(sessions::id.eq(session_id.as_str())),
            ))
            .get_result::<bool>(connection)
            .map_err(SessionStoreError::persistence)?;

            if exists {
                Err(SessionStoreError::VersionConflict {
                    session_id,
                    expected,
                })
            } else {
                Err(SessionStoreError::NotFound(session_id))
            }
        })
        .await
    }
}
