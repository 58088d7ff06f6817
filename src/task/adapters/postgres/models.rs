//! Diesel row models for task instance persistence.

use super::schema::task_instances;
use crate::directory::domain::UserId;
use crate::task::domain::{
    PersistedTaskData, ProblemSeverity, Rating, TaskId, TaskInstance, TaskStatus,
};
use crate::task::ports::{TaskRepositoryError, TaskRepositoryResult};
use crate::template::domain::TemplateId;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task instance records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_instances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Originating template identifier.
    pub template_id: uuid::Uuid,
    /// Optional title override.
    pub title: Option<String>,
    /// Optional description override.
    pub description: Option<String>,
    /// Scheduled time.
    pub scheduled_for: DateTime<Utc>,
    /// Lifecycle status.
    pub status: String,
    /// Most recent problem message, if any.
    pub problem_message: Option<String>,
    /// Most recent problem severity, if any.
    pub problem_severity: Option<String>,
    /// Optional resolution note.
    pub resolution_note: Option<String>,
    /// Optional completion photo reference.
    pub completion_photo: Option<String>,
    /// Optional rating.
    pub rating: Option<i16>,
    /// Optional review note.
    pub review_note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Creator identifier.
    pub created_by: uuid::Uuid,
    /// Assignee identifier.
    pub assigned_to: uuid::Uuid,
}

/// Insert and update model for task instance records.
///
/// `None` values map to SQL `NULL` on update; problem fields are never
/// cleared by the domain, so this only surfaces for fields the engine
/// actually rewrites.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = task_instances)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Originating template identifier.
    pub template_id: uuid::Uuid,
    /// Optional title override.
    pub title: Option<String>,
    /// Optional description override.
    pub description: Option<String>,
    /// Scheduled time.
    pub scheduled_for: DateTime<Utc>,
    /// Lifecycle status.
    pub status: String,
    /// Most recent problem message, if any.
    pub problem_message: Option<String>,
    /// Most recent problem severity, if any.
    pub problem_severity: Option<String>,
    /// Optional resolution note.
    pub resolution_note: Option<String>,
    /// Optional completion photo reference.
    pub completion_photo: Option<String>,
    /// Optional rating.
    pub rating: Option<i16>,
    /// Optional review note.
    pub review_note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Creator identifier.
    pub created_by: uuid::Uuid,
    /// Assignee identifier.
    pub assigned_to: uuid::Uuid,
}

impl NewTaskRow {
    /// Builds a row from a domain task instance.
    #[must_use]
    pub fn from_task(task: &TaskInstance) -> Self {
        Self {
            id: task.id().into_inner(),
            template_id: task.template_id().into_inner(),
            title: task.title().map(str::to_owned),
            description: task.description().map(str::to_owned),
            scheduled_for: task.scheduled_for(),
            status: task.status().as_str().to_owned(),
            problem_message: task.problem_message().map(str::to_owned),
            problem_severity: task
                .problem_severity()
                .map(|severity| severity.as_str().to_owned()),
            resolution_note: task.resolution_note().map(str::to_owned),
            completion_photo: task.completion_photo().map(str::to_owned),
            rating: task.rating().map(|rating| i16::from(rating.value())),
            review_note: task.review_note().map(str::to_owned),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            created_by: task.created_by().into_inner(),
            assigned_to: task.assigned_to().into_inner(),
        }
    }
}

/// Converts a stored row back into the domain aggregate.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when a stored status,
/// severity, or rating does not parse; the closed domain sets make that
/// a data corruption signal rather than a caller error.
pub fn row_to_task(row: TaskRow) -> TaskRepositoryResult<TaskInstance> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let problem_severity = row
        .problem_severity
        .as_deref()
        .map(ProblemSeverity::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let rating = row
        .rating
        .map(|value| {
            u8::try_from(value)
                .map_err(TaskRepositoryError::persistence)
                .and_then(|value| {
                    Rating::new(value).map_err(TaskRepositoryError::persistence)
                })
        })
        .transpose()?;

    Ok(TaskInstance::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        template_id: TemplateId::from_uuid(row.template_id),
        title: row.title,
        description: row.description,
        scheduled_for: row.scheduled_for,
        status,
        problem_message: row.problem_message,
        problem_severity,
        resolution_note: row.resolution_note,
        completion_photo: row.completion_photo,
        rating,
        review_note: row.review_note,
        created_at: row.created_at,
        updated_at: row.updated_at,
        created_by: UserId::from_uuid(row.created_by),
        assigned_to: UserId::from_uuid(row.assigned_to),
    }))
}
