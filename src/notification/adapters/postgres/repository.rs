//! `PostgreSQL` notification feed implementation.

use super::{models::NotificationRow, schema::notifications};
use crate::directory::domain::UserId;
use crate::notification::{
    domain::{Notification, NotificationId, PersistedNotificationData},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by the notification adapter.
pub type NotificationPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed notification feed.
#[derive(Debug, Clone)]
pub struct PostgresNotificationFeed {
    pool: NotificationPgPool,
}

impl PostgresNotificationFeed {
    /// Creates a new feed from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: NotificationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(NotificationRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationRepositoryError::persistence)?
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationFeed {
    async fn list_for_user(
        &self,
        user: UserId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        self.run_blocking(move |connection| load_feed(connection, user)).await
    }

    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Notification> {
        self.run_blocking(move |connection| {
            let row = diesel::update(
                notifications::table.filter(notifications::id.eq(id.into_inner())),
            )
            .set(notifications::is_read.eq(true))
            .get_result::<NotificationRow>(connection)
            .map_err(|err| match err {
                DieselError::NotFound => NotificationRepositoryError::NotFound(id),
                _ => NotificationRepositoryError::persistence(err),
            })?;
            Ok(row_to_notification(row))
        })
        .await
    }

    async fn mark_all_read(
        &self,
        user: UserId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        self.run_blocking(move |connection| {
            diesel::update(
                notifications::table
                    .filter(notifications::user_id.eq(user.into_inner()))
                    .filter(notifications::is_read.eq(false)),
            )
            .set(notifications::is_read.eq(true))
            .execute(connection)
            .map_err(NotificationRepositoryError::persistence)?;
            load_feed(connection, user)
        })
        .await
    }
}

fn load_feed(
    connection: &mut PgConnection,
    user: UserId,
) -> NotificationRepositoryResult<Vec<Notification>> {
    let rows = notifications::table
        .filter(notifications::user_id.eq(user.into_inner()))
        .order(notifications::created_at.desc())
        .select(NotificationRow::as_select())
        .load::<NotificationRow>(connection)
        .map_err(NotificationRepositoryError::persistence)?;
    Ok(rows.into_iter().map(row_to_notification).collect())
}

fn row_to_notification(row: NotificationRow) -> Notification {
    Notification::from_persisted(PersistedNotificationData {
        id: NotificationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        message: row.message,
        is_read: row.is_read,
        created_at: row.created_at,
    })
}
