//! `PostgreSQL` user directory implementation.

use super::{models::UserRow, schema::app_users};
use crate::directory::{
    domain::{PersistedUserData, User, UserId, UserRole},
    ports::{DirectoryError, DirectoryResult, UserDirectory},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by the directory adapter.
pub type DirectoryPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed user directory.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: DirectoryPgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DirectoryPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DirectoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DirectoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DirectoryError::persistence)?
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = app_users::table
                .filter(app_users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(DirectoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn list_by_role(&self, role: UserRole) -> DirectoryResult<Vec<User>> {
        self.run_blocking(move |connection| {
            let rows = app_users::table
                .filter(app_users::role.eq(role.as_str()))
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(DirectoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }
}

fn row_to_user(row: UserRow) -> DirectoryResult<User> {
    let role = UserRole::try_from(row.role.as_str()).map_err(DirectoryError::persistence)?;
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(row.id),
        full_name: row.full_name,
        role,
        is_active: row.is_active,
    }))
}
