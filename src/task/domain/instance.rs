//! Task instance aggregate root and its state machine.

use super::{ProblemSeverity, Rating, TaskDomainError, TaskId, TaskStatus};
use crate::directory::domain::UserId;
use crate::template::domain::TemplateId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Parameter object for creating a new task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskInstance {
    /// Template the instance is derived from.
    pub template_id: TemplateId,
    /// Coordinator creating the instance.
    pub created_by: UserId,
    /// Caregiver the instance is assigned to.
    pub assigned_to: UserId,
    /// When the task is scheduled to happen.
    pub scheduled_for: DateTime<Utc>,
    /// Optional title override; the template title applies otherwise.
    pub title: Option<String>,
    /// Optional description override.
    pub description: Option<String>,
}

/// Requested status change with its optional report fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    status: TaskStatus,
    problem_message: Option<String>,
    problem_severity: Option<ProblemSeverity>,
    resolution_note: Option<String>,
}

impl StatusChange {
    /// Creates a change request targeting the given status.
    #[must_use]
    pub const fn to(status: TaskStatus) -> Self {
        Self {
            status,
            problem_message: None,
            problem_severity: None,
            resolution_note: None,
        }
    }

    /// Attaches the problem message required when entering `problem`.
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

    /// Returns the targeted status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }
}

/// Task instance aggregate root.
///
/// A scheduled, assigned occurrence of a templated task. All status and
/// schedule mutations go through the methods here so the state machine
/// cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    id: TaskId,
    template_id: TemplateId,
    title: Option<String>,
    description: Option<String>,
    scheduled_for: DateTime<Utc>,
    status: TaskStatus,
    problem_message: Option<String>,
    problem_severity: Option<ProblemSeverity>,
    resolution_note: Option<String>,
    completion_photo: Option<String>,
    rating: Option<Rating>,
    review_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: UserId,
    assigned_to: UserId,
}

/// Parameter object for reconstructing a persisted task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted template reference.
    pub template_id: TemplateId,
    /// Persisted title override, if any.
    pub title: Option<String>,
    /// Persisted description override, if any.
    pub description: Option<String>,
    /// Persisted schedule.
    pub scheduled_for: DateTime<Utc>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted problem message, if the task ever entered `problem`.
    pub problem_message: Option<String>,
    /// Persisted problem severity, if any.
    pub problem_severity: Option<ProblemSeverity>,
    /// Persisted resolution note, if any.
    pub resolution_note: Option<String>,
    /// Persisted completion photo reference, if any.
    pub completion_photo: Option<String>,
    /// Persisted rating, if any.
    pub rating: Option<Rating>,
    /// Persisted review note, if any.
    pub review_note: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted creator (coordinator) identifier.
    pub created_by: UserId,
    /// Persisted assignee (caregiver) identifier.
    pub assigned_to: UserId,
}

impl TaskInstance {
    /// Creates a new pending task instance.
    ///
    /// The caller has already verified that `created_by` names a
    /// coordinator and `assigned_to` a caregiver; both are fixed for the
    /// instance's lifetime.
    #[must_use]
    pub fn create(spec: NewTaskInstance, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            template_id: spec.template_id,
            title: spec.title,
            description: spec.description,
            scheduled_for: spec.scheduled_for,
            status: TaskStatus::Pending,
            problem_message: None,
            problem_severity: None,
            resolution_note: None,
            completion_photo: None,
            rating: None,
            review_note: None,
            created_at: timestamp,
            updated_at: timestamp,
            created_by: spec.created_by,
            assigned_to: spec.assigned_to,
        }
    }

    /// Reconstructs a task instance from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            template_id: data.template_id,
            title: data.title,
            description: data.description,
            scheduled_for: data.scheduled_for,
            status: data.status,
            problem_message: data.problem_message,
            problem_severity: data.problem_severity,
            resolution_note: data.resolution_note,
            completion_photo: data.completion_photo,
            rating: data.rating,
            review_note: data.review_note,
            created_at: data.created_at,
            updated_at: data.updated_at,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the originating template.
    #[must_use]
    pub const fn template_id(&self) -> TemplateId {
        self.template_id
    }

    /// Returns the title override, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the description override, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the scheduled time.
    #[must_use]
    pub const fn scheduled_for(&self) -> DateTime<Utc> {
        self.scheduled_for
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the message of the most recent problem report, if any.
    ///
    /// Problem fields are not cleared when the task later leaves
    /// `problem`; they remember the last report.
    #[must_use]
    pub fn problem_message(&self) -> Option<&str> {
        self.problem_message.as_deref()
    }

    /// Returns the severity of the most recent problem report, if any.
    #[must_use]
    pub const fn problem_severity(&self) -> Option<ProblemSeverity> {
        self.problem_severity
    }

    /// Returns the resolution note, if any.
    #[must_use]
    pub fn resolution_note(&self) -> Option<&str> {
        self.resolution_note.as_deref()
    }

    /// Returns the completion photo reference, if any.
    ///
    /// Photo upload is handled outside this core; the reference only
    /// round-trips through persistence here.
    #[must_use]
    pub fn completion_photo(&self) -> Option<&str> {
        self.completion_photo.as_deref()
    }

    /// Returns the rating, if the task has been rated.
    #[must_use]
    pub const fn rating(&self) -> Option<Rating> {
        self.rating
    }

    /// Returns the review note, if any.
    #[must_use]
    pub fn review_note(&self) -> Option<&str> {
        self.review_note.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the creator (coordinator) identifier.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the assignee (caregiver) identifier.
    #[must_use]
    pub const fn assigned_to(&self) -> UserId {
        self.assigned_to
    }

    /// Applies a caregiver status change.
    ///
    /// Entering `problem` requires a non-empty problem message; the
    /// message and severity then replace any earlier report and stay on
    /// the task after it leaves `problem`. A resolution note is recorded
    /// whenever one is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the
    /// state machine forbids the move and
    /// [`TaskDomainError::MissingProblemMessage`] when a problem report
    /// carries no usable message.
    pub fn apply_status(
        &mut self,
        change: StatusChange,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(change.status) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id,
                from: self.status,
                to: change.status,
            });
        }

        if change.status == TaskStatus::Problem {
            let message = change
                .problem_message
                .filter(|message| !message.trim().is_empty())
                .ok_or(TaskDomainError::MissingProblemMessage(self.id))?;
            self.problem_message = Some(message);
            self.problem_severity = change.problem_severity;
        }

        if let Some(note) = change.resolution_note {
            self.resolution_note = Some(note);
        }

        self.status = change.status;
        self.touch(clock);
        Ok(())
    }

    /// Moves the task to a new scheduled time.
    ///
    /// Permitted from any status, including `done` and `cancelled`:
    /// changing the time reopens the task, so the status unconditionally
    /// resets to `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnchangedSchedule`] when the new time
    /// equals the one already held; a reschedule must actually move the
    /// task.
    pub fn reschedule(
        &mut self,
        new_time: DateTime<Utc>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if new_time == self.scheduled_for {
            return Err(TaskDomainError::UnchangedSchedule {
                task_id: self.id,
                scheduled_for: self.scheduled_for,
            });
        }
        self.scheduled_for = new_time;
        self.status = TaskStatus::Pending;
        self.touch(clock);
        Ok(())
    }

    /// Records a coordinator rating for the completed task.
    ///
    /// Rating is not a status transition and leaves `updated_at` alone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::RatingRequiresCompletion`] when the
    /// task is not `done`.
    pub fn rate(
        &mut self,
        rating: Rating,
        review_note: Option<String>,
    ) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::Done {
            return Err(TaskDomainError::RatingRequiresCompletion {
                task_id: self.id,
                status: self.status,
            });
        }
        self.rating = Some(rating);
        self.review_note = review_note;
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
