//! Task lifecycle orchestration: authorize, validate, mutate, commit.
//!
//! The service is the only component that changes a task instance's
//! status or schedule. Every command runs its checks eagerly — directory
//! lookups, the authorization guard, the domain state machine — before
//! the single repository commit that writes the mutation together with
//! its audit entry and counterpart notification.

use crate::activity::domain::{ActivityAction, ActivityLogEntry, EntityKind};
use crate::authz::{AccessDenied, Operation, authorize};
use crate::directory::{
    domain::{User, UserId},
    ports::{DirectoryError, UserDirectory},
};
use crate::notification::dispatch::{TaskEvent, dispatch, format_schedule};
use crate::task::{
    domain::{
        NewTaskInstance, ProblemSeverity, Rating, StatusChange, TaskDomainError, TaskId,
        TaskInstance, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::template::{
    domain::TemplateId,
    ports::{TemplateRepository, TemplateRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating and assigning a task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    template_id: TemplateId,
    created_by: UserId,
    assigned_to: UserId,
    scheduled_for: DateTime<Utc>,
    title: Option<String>,
    description: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub const fn new(
        template_id: TemplateId,
        created_by: UserId,
        assigned_to: UserId,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        Self {
            template_id,
            created_by,
            assigned_to,
            scheduled_for,
            title: None,
            description: None,
        }
    }

    /// Sets a title override.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a description override.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for a caregiver status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatusRequest {
    task_id: TaskId,
    actor: UserId,
    status: TaskStatus,
    problem_message: Option<String>,
    problem_severity: Option<ProblemSeverity>,
    resolution_note: Option<String>,
}

impl UpdateStatusRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub const fn new(task_id: TaskId, actor: UserId, status: TaskStatus) -> Self {
        Self {
            task_id,
            actor,
            status,
            problem_message: None,
            problem_severity: None,
            resolution_note: None,
        }
    }

    /// Attaches the problem message required when reporting a problem.
    #[must_use]
    pub fn with_problem_message(mut self, message: impl Into<String>) -> Self {
        self.problem_message = Some(message.into());
        self
    }

    /// Attaches a problem severity.
    #[must_use]
    pub fn with_problem_severity(mut self, severity: ProblemSeverity) -> Self {
        self.problem_severity = Some(severity);
        self
    }

    /// Attaches a resolution note.
    #[must_use]
    pub fn with_resolution_note(mut self, note: impl Into<String>) -> Self {
        self.resolution_note = Some(note.into());
        self
    }
}

/// Request payload for rating a completed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTaskRequest {
    task_id: TaskId,
    actor: UserId,
    rating: u8,
    review_note: Option<String>,
}

impl RateTaskRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub const fn new(task_id: TaskId, actor: UserId, rating: u8) -> Self {
        Self {
            task_id,
            actor,
            rating,
            review_note: None,
        }
    }

    /// Attaches a review note.
    #[must_use]
    pub fn with_review_note(mut self, note: impl Into<String>) -> Self {
        self.review_note = Some(note.into());
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// A referenced user does not exist in the directory.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The referenced template does not exist.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Authorization was denied.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// The domain state machine rejected the mutation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Template lookup failed.
    #[error(transparent)]
    Templates(#[from] TemplateRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, T, U, C>
where
    R: TaskRepository,
    T: TemplateRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    templates: Arc<T>,
    directory: Arc<U>,
    clock: Arc<C>,
}

impl<R, T, U, C> TaskLifecycleService<R, T, U, C>
where
    R: TaskRepository,
    T: TemplateRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(
        tasks: Arc<R>,
        templates: Arc<T>,
        directory: Arc<U>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            templates,
            directory,
            clock,
        }
    }

    /// Creates a pending task instance and assigns it to a caregiver.
    ///
    /// Commits the instance together with a `CREATE_TASK` audit entry
    /// and an assignment notification for the caregiver.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the creator, assignee, or
    /// template is unknown, the creator is not a coordinator, the
    /// assignee is not a caregiver, or the commit fails.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<TaskInstance> {
        let creator = self.require_user(request.created_by).await?;
        let assignee = self.require_user(request.assigned_to).await?;
        authorize(
            &creator,
            Operation::CreateTask {
                assignee: &assignee,
            },
        )?;
        if self
            .templates
            .find_by_id(request.template_id)
            .await?
            .is_none()
        {
            return Err(TaskLifecycleError::TemplateNotFound(request.template_id));
        }

        let task = TaskInstance::create(
            NewTaskInstance {
                template_id: request.template_id,
                created_by: creator.id(),
                assigned_to: assignee.id(),
                scheduled_for: request.scheduled_for,
                title: request.title,
                description: request.description,
            },
            &*self.clock,
        );

        let audit =
            ActivityLogEntry::record(creator.id(), ActivityAction::CreateTask, &*self.clock)
                .with_entity(EntityKind::TaskInstance, task.id().into_inner())
                .with_details(format!(
                    "assigned_to={}, scheduled_for={}",
                    assignee.id(),
                    format_schedule(task.scheduled_for())
                ));
        let notice = dispatch(
            assignee.id(),
            &TaskEvent::Assigned {
                scheduled_for: task.scheduled_for(),
            },
            &*self.clock,
        );

        self.tasks.insert(&task, &audit, &notice).await?;
        Ok(task)
    }

    /// Moves a task the actor created to a new scheduled time.
    ///
    /// The status resets to `pending` regardless of what it was —
    /// changing the time reopens the task. Commits with an `UPDATE_TASK`
    /// audit entry and a reschedule notification for the caregiver.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or actor is unknown,
    /// the actor did not create the task, the new time equals the
    /// current one, or the commit fails.
    pub async fn reschedule_task(
        &self,
        task_id: TaskId,
        actor_id: UserId,
        new_time: DateTime<Utc>,
    ) -> TaskLifecycleResult<TaskInstance> {
        let mut task = self.require_task(task_id).await?;
        let actor = self.require_user(actor_id).await?;
        authorize(&actor, Operation::RescheduleTask { task: &task })?;

        task.reschedule(new_time, &*self.clock)?;

        let audit =
            ActivityLogEntry::record(actor.id(), ActivityAction::UpdateTask, &*self.clock)
                .with_entity(EntityKind::TaskInstance, task.id().into_inner())
                .with_details(format!("scheduled_for={}", format_schedule(new_time)));
        let notice = dispatch(
            task.assigned_to(),
            &TaskEvent::Rescheduled {
                scheduled_for: new_time,
            },
            &*self.clock,
        );

        self.tasks.update(&task, Some(&audit), &notice).await?;
        Ok(task)
    }

    /// Applies a caregiver status update to a task assigned to the
    /// actor.
    ///
    /// Commits with an `UPDATE_TASK_STATUS` audit entry and a
    /// status-specific notification for the coordinator who created the
    /// task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or actor is unknown,
    /// the task is assigned to someone else, the state machine rejects
    /// the transition, a problem report lacks its message, or the commit
    /// fails.
    pub async fn update_status(
        &self,
        request: UpdateStatusRequest,
    ) -> TaskLifecycleResult<TaskInstance> {
        let actor = self.require_user(request.actor).await?;
        let mut task = self.require_task(request.task_id).await?;
        authorize(&actor, Operation::UpdateTaskStatus { task: &task })?;

        let mut change = StatusChange::to(request.status);
        if let Some(message) = request.problem_message {
            change = change.with_problem_message(message);
        }
        if let Some(severity) = request.problem_severity {
            change = change.with_problem_severity(severity);
        }
        if let Some(note) = request.resolution_note {
            change = change.with_resolution_note(note);
        }
        task.apply_status(change, &*self.clock)?;

        let mut details = format!("status={}", task.status());
        if task.status() == TaskStatus::Problem {
            if let Some(message) = task.problem_message() {
                details.push_str(&format!(", problem_message={message}"));
            }
        }
        let audit =
            ActivityLogEntry::record(actor.id(), ActivityAction::UpdateTaskStatus, &*self.clock)
                .with_entity(EntityKind::TaskInstance, task.id().into_inner())
                .with_details(details);

        let event = match task.status() {
            TaskStatus::Done => TaskEvent::Completed {
                scheduled_for: task.scheduled_for(),
            },
            TaskStatus::Problem => TaskEvent::ProblemReported {
                message: task.problem_message().unwrap_or_default(),
            },
            status => TaskEvent::StatusChanged { status },
        };
        let notice = dispatch(task.created_by(), &event, &*self.clock);

        self.tasks.update(&task, Some(&audit), &notice).await?;
        Ok(task)
    }

    /// Rates a completed task the actor created.
    ///
    /// Rating notifies the caregiver but carries no audit entry and is
    /// not a status transition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or actor is unknown,
    /// the actor did not create the task, the task is not done, the
    /// rating falls outside 1–5, or the commit fails.
    pub async fn rate_task(
        &self,
        request: RateTaskRequest,
    ) -> TaskLifecycleResult<TaskInstance> {
        let actor = self.require_user(request.actor).await?;
        let mut task = self.require_task(request.task_id).await?;
        authorize(&actor, Operation::RateTask { task: &task })?;

        let rating = Rating::new(request.rating)?;
        task.rate(rating, request.review_note)?;

        let notice = dispatch(
            task.assigned_to(),
            &TaskEvent::Rated { rating },
            &*self.clock,
        );

        self.tasks.update(&task, None, &notice).await?;
        Ok(task)
    }

    /// Deletes a task the actor created.
    ///
    /// Commits the removal with a `DELETE_TASK` audit entry and a
    /// notification telling the caregiver the task is gone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task or actor is unknown,
    /// the actor did not create the task, or the commit fails.
    pub async fn delete_task(
        &self,
        task_id: TaskId,
        actor_id: UserId,
    ) -> TaskLifecycleResult<()> {
        let task = self.require_task(task_id).await?;
        let actor = self.require_user(actor_id).await?;
        authorize(&actor, Operation::DeleteTask { task: &task })?;

        let audit =
            ActivityLogEntry::record(actor.id(), ActivityAction::DeleteTask, &*self.clock)
                .with_entity(EntityKind::TaskInstance, task.id().into_inner());
        let notice = dispatch(task.assigned_to(), &TaskEvent::Removed, &*self.clock);

        self.tasks.remove(task.id(), &audit, &notice).await?;
        Ok(())
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when no such task exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn get_task(&self, id: TaskId) -> TaskLifecycleResult<Option<TaskInstance>> {
        Ok(self.tasks.find_by_id(id).await?)
    }

    /// Lists the tasks assigned to a caregiver, soonest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_assigned(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskLifecycleResult<Vec<TaskInstance>> {
        Ok(self.tasks.list_for_assignee(user, status).await?)
    }

    /// Lists the tasks a coordinator created, soonest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_created(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskLifecycleResult<Vec<TaskInstance>> {
        Ok(self.tasks.list_created_by(user, status).await?)
    }

    async fn require_user(&self, id: UserId) -> TaskLifecycleResult<User> {
        self.directory
            .find_user(id)
            .await?
            .ok_or(TaskLifecycleError::UserNotFound(id))
    }

    async fn require_task(&self, id: TaskId) -> TaskLifecycleResult<TaskInstance> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(id))
    }
}
