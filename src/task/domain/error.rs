//! Error types for task domain validation and parsing.

use super::ids::TaskId;
use super::status::TaskStatus;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while mutating or constructing task instances.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status change is not a permitted transition.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status that was requested.
        to: TaskStatus,
    },

    /// A problem report arrived without a problem message.
    #[error("task {0} cannot enter problem status without a message")]
    MissingProblemMessage(TaskId),

    /// A rating was attempted on a task that is not done.
    #[error("task {task_id} cannot be rated while {status}")]
    RatingRequiresCompletion {
        /// Task whose rating was rejected.
        task_id: TaskId,
        /// Status the task currently holds.
        status: TaskStatus,
    },

    /// A reschedule named the time the task already holds.
    #[error("task {task_id} is already scheduled for {scheduled_for}")]
    UnchangedSchedule {
        /// Task whose reschedule was rejected.
        task_id: TaskId,
        /// The schedule both sides agree on.
        scheduled_for: DateTime<Utc>,
    },

    /// The rating value falls outside the accepted 1–5 range.
    #[error("invalid rating {0}, expected a value between 1 and 5")]
    InvalidRating(u8),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing problem severities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown problem severity: {0}")]
pub struct ParseSeverityError(pub String);
