//! `PostgreSQL` activity log implementation.

use super::{models::ActivityLogRow, schema::activity_log};
use crate::activity::{
    domain::{
        ActivityAction, ActivityLogEntry, ActivityLogId, EntityKind, PersistedActivityData,
    },
    ports::{ActivityLogError, ActivityLogRepository, ActivityLogResult},
};
use crate::directory::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by the activity adapter.
pub type ActivityPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed activity log.
#[derive(Debug, Clone)]
pub struct PostgresActivityLog {
    pool: ActivityPgPool,
}

impl PostgresActivityLog {
    /// Creates a new log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ActivityPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ActivityLogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ActivityLogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ActivityLogError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ActivityLogError::persistence)?
    }
}

#[async_trait]
impl ActivityLogRepository for PostgresActivityLog {
    async fn list_for_actor(&self, user: UserId) -> ActivityLogResult<Vec<ActivityLogEntry>> {
        self.run_blocking(move |connection| {
            let rows = activity_log::table
                .filter(activity_log::user_id.eq(user.into_inner()))
                .order(activity_log::recorded_at.desc())
                .select(ActivityLogRow::as_select())
                .load::<ActivityLogRow>(connection)
                .map_err(ActivityLogError::persistence)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }
}

fn row_to_entry(row: ActivityLogRow) -> ActivityLogResult<ActivityLogEntry> {
    let action =
        ActivityAction::try_from(row.action.as_str()).map_err(ActivityLogError::persistence)?;
    let entity_type = row
        .entity_type
        .as_deref()
        .map(EntityKind::try_from)
        .transpose()
        .map_err(ActivityLogError::persistence)?;
    Ok(ActivityLogEntry::from_persisted(PersistedActivityData {
        id: ActivityLogId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        action,
        entity_type,
        entity_id: row.entity_id,
        timestamp: row.recorded_at,
        details: row.details,
    }))
}
