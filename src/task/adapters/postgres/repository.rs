//! `PostgreSQL` repository implementation for task instance storage.

use super::{
    models::{NewTaskRow, TaskRow, row_to_task},
    schema::task_instances,
};
use crate::activity::adapters::postgres::models::NewActivityLogRow;
use crate::activity::adapters::postgres::schema::activity_log;
use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use crate::notification::adapters::postgres::models::NewNotificationRow;
use crate::notification::adapters::postgres::schema::notifications;
use crate::notification::domain::Notification;
use crate::task::{
    domain::{TaskId, TaskInstance, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Each commit runs the entity write, the audit insert, and the
/// notification insert in one database transaction; the row-scoped
/// write lock taken by the entity statement serialises concurrent
/// commits on the same instance.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(
        &self,
        task: &TaskInstance,
        audit: &ActivityLogEntry,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = NewTaskRow::from_task(task);
        let audit_row = NewActivityLogRow::from_entry(audit);
        let notice_row = NewNotificationRow::from_record(notice);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    diesel::insert_into(task_instances::table)
                        .values(&row)
                        .execute(conn)?;
                    insert_effects(conn, &audit_row, &notice_row)
                })
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn update(
        &self,
        task: &TaskInstance,
        audit: Option<&ActivityLogEntry>,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = NewTaskRow::from_task(task);
        let audit_row = audit.map(NewActivityLogRow::from_entry);
        let notice_row = NewNotificationRow::from_record(notice);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    let updated = diesel::update(
                        task_instances::table.filter(task_instances::id.eq(row.id)),
                    )
                    .set(&row)
                    .execute(conn)?;
                    if updated == 0 {
                        return Err(DieselError::NotFound);
                    }
                    if let Some(entry) = &audit_row {
                        diesel::insert_into(activity_log::table)
                            .values(entry)
                            .execute(conn)?;
                    }
                    diesel::insert_into(notifications::table)
                        .values(&notice_row)
                        .execute(conn)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::NotFound => TaskRepositoryError::NotFound(task_id),
                    _ => TaskRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn remove(
        &self,
        id: TaskId,
        audit: &ActivityLogEntry,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        let audit_row = NewActivityLogRow::from_entry(audit);
        let notice_row = NewNotificationRow::from_record(notice);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    let removed = diesel::delete(
                        task_instances::table.filter(task_instances::id.eq(id.into_inner())),
                    )
                    .execute(conn)?;
                    if removed == 0 {
                        return Err(DieselError::NotFound);
                    }
                    insert_effects(conn, &audit_row, &notice_row)
                })
                .map_err(|err| match err {
                    DieselError::NotFound => TaskRepositoryError::NotFound(id),
                    _ => TaskRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskInstance>> {
        self.run_blocking(move |connection| {
            let row = task_instances::table
                .filter(task_instances::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_for_assignee(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<TaskInstance>> {
        self.run_blocking(move |connection| {
            let mut query = task_instances::table
                .select(TaskRow::as_select())
                .filter(task_instances::assigned_to.eq(user.into_inner()))
                .order(task_instances::scheduled_for.asc())
                .into_boxed();
            if let Some(wanted) = status {
                query = query.filter(task_instances::status.eq(wanted.as_str()));
            }
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_created_by(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<TaskInstance>> {
        self.run_blocking(move |connection| {
            let mut query = task_instances::table
                .select(TaskRow::as_select())
                .filter(task_instances::created_by.eq(user.into_inner()))
                .order(task_instances::scheduled_for.asc())
                .into_boxed();
            if let Some(wanted) = status {
                query = query.filter(task_instances::status.eq(wanted.as_str()));
            }
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn insert_effects(
    conn: &mut PgConnection,
    audit_row: &NewActivityLogRow,
    notice_row: &NewNotificationRow,
) -> Result<(), DieselError> {
    diesel::insert_into(activity_log::table)
        .values(audit_row)
        .execute(conn)?;
    diesel::insert_into(notifications::table)
        .values(notice_row)
        .execute(conn)?;
    Ok(())
}
