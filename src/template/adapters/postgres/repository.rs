//! `PostgreSQL` repository implementation for template storage.

use super::{
    models::{NewTemplateRow, TemplateRow},
    schema::task_templates,
};
use crate::activity::adapters::postgres::models::NewActivityLogRow;
use crate::activity::adapters::postgres::schema::activity_log;
use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use crate::template::{
    domain::{
        PersistedTemplateData, TaskTemplate, TemplateId, TemplateTitle, TimeOfDay,
    },
    ports::{TemplateRepository, TemplateRepositoryError, TemplateRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by template adapters.
pub type TemplatePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed template repository.
///
/// Each mutating call runs the template write and its audit entry in one
/// database transaction.
#[derive(Debug, Clone)]
pub struct PostgresTemplateRepository {
    pool: TemplatePgPool,
}

impl PostgresTemplateRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TemplatePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TemplateRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TemplateRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TemplateRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TemplateRepositoryError::persistence)?
    }
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepository {
    async fn insert(
        &self,
        template: &TaskTemplate,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()> {
        let template_id = template.id();
        let row = NewTemplateRow::from_template(template);
        let audit_row = NewActivityLogRow::from_entry(audit);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    diesel::insert_into(task_templates::table)
                        .values(&row)
                        .execute(conn)?;
                    diesel::insert_into(activity_log::table)
                        .values(&audit_row)
                        .execute(conn)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TemplateRepositoryError::DuplicateTemplate(template_id)
                    }
                    _ => TemplateRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn update(
        &self,
        template: &TaskTemplate,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()> {
        let template_id = template.id();
        let row = NewTemplateRow::from_template(template);
        let audit_row = NewActivityLogRow::from_entry(audit);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    let updated = diesel::update(
                        task_templates::table.filter(task_templates::id.eq(row.id)),
                    )
                    .set(&row)
                    .execute(conn)?;
                    if updated == 0 {
                        return Err(DieselError::NotFound);
                    }
                    diesel::insert_into(activity_log::table)
                        .values(&audit_row)
                        .execute(conn)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::NotFound => TemplateRepositoryError::NotFound(template_id),
                    _ => TemplateRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn remove(
        &self,
        id: TemplateId,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()> {
        let audit_row = NewActivityLogRow::from_entry(audit);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    let removed = diesel::delete(
                        task_templates::table.filter(task_templates::id.eq(id.into_inner())),
                    )
                    .execute(conn)?;
                    if removed == 0 {
                        return Err(DieselError::NotFound);
                    }
                    diesel::insert_into(activity_log::table)
                        .values(&audit_row)
                        .execute(conn)?;
                    Ok(())
                })
                .map_err(|err| match err {
                    DieselError::NotFound => TemplateRepositoryError::NotFound(id),
                    _ => TemplateRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn find_by_id(&self, id: TemplateId) -> TemplateRepositoryResult<Option<TaskTemplate>> {
        self.run_blocking(move |connection| {
            let row = task_templates::table
                .filter(task_templates::id.eq(id.into_inner()))
                .select(TemplateRow::as_select())
                .first::<TemplateRow>(connection)
                .optional()
                .map_err(TemplateRepositoryError::persistence)?;
            row.map(row_to_template).transpose()
        })
        .await
    }

    async fn list(&self) -> TemplateRepositoryResult<Vec<TaskTemplate>> {
        self.run_blocking(move |connection| {
            let rows = task_templates::table
                .order(task_templates::created_at.asc())
                .select(TemplateRow::as_select())
                .load::<TemplateRow>(connection)
                .map_err(TemplateRepositoryError::persistence)?;
            rows.into_iter().map(row_to_template).collect()
        })
        .await
    }

    async fn list_for_owner(&self, owner: UserId) -> TemplateRepositoryResult<Vec<TaskTemplate>> {
        self.run_blocking(move |connection| {
            let rows = task_templates::table
                .filter(task_templates::created_by.eq(owner.into_inner()))
                .order(task_templates::created_at.asc())
                .select(TemplateRow::as_select())
                .load::<TemplateRow>(connection)
                .map_err(TemplateRepositoryError::persistence)?;
            rows.into_iter().map(row_to_template).collect()
        })
        .await
    }
}

fn row_to_template(row: TemplateRow) -> TemplateRepositoryResult<TaskTemplate> {
    let title =
        TemplateTitle::new(row.title).map_err(TemplateRepositoryError::persistence)?;
    let default_time = row
        .default_time
        .as_deref()
        .map(TimeOfDay::parse)
        .transpose()
        .map_err(TemplateRepositoryError::persistence)?;
    Ok(TaskTemplate::from_persisted(PersistedTemplateData {
        id: TemplateId::from_uuid(row.id),
        title,
        description: row.description,
        default_time,
        created_by: UserId::from_uuid(row.created_by),
        is_active: row.is_active,
        created_at: row.created_at,
    }))
}
