//! Repository port for task instance persistence.
//!
//! Mutating operations accept the side-effect records (audit entry and
//! counterpart notification) the engine computed, so the adapter can
//! commit the mutation and its trail as one atomic unit. An observer can
//! therefore never see a notification or audit row for a mutation that
//! did not happen.

use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use crate::notification::domain::Notification;
use crate::task::domain::{TaskId, TaskInstance, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task instance persistence contract.
///
/// Implementations serialise commits per task instance: between two
/// concurrent commits on the same instance the last serialised writer
/// determines the final entity state, while both audit entries and both
/// notifications are retained.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task instance with its audit entry and assignee
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task
    /// identifier already exists.
    async fn insert(
        &self,
        task: &TaskInstance,
        audit: &ActivityLogEntry,
        notice: &Notification,
    ) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task instance with the side
    /// effects describing them.
    ///
    /// `audit` is `None` only for rating, which notifies the caregiver
    /// but carries no audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update(
        &self,
        task: &TaskInstance,
        audit: Option<&ActivityLogEntry>,
        notice: &Notification,
    ) -> TaskRepositoryResult<()>;

    /// Removes a task instance with the audit entry and assignee
    /// notification describing the deletion.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn remove(
        &self,
        id: TaskId,
        audit: &ActivityLogEntry,
        notice: &Notification,
    ) -> TaskRepositoryResult<()>;

    /// Finds a task instance by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskInstance>>;

    /// Returns the tasks assigned to a caregiver, soonest first,
    /// optionally narrowed to one status.
    async fn list_for_assignee(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<TaskInstance>>;

    /// Returns the tasks a coordinator created, soonest first,
    /// optionally narrowed to one status.
    async fn list_created_by(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<TaskInstance>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
