//! Deterministic composition of counterpart notifications.
//!
//! Message text is derived only from the triggering task event and its
//! parameters, so the same mutation always produces the same wording.
//! Dispatching never fails: the caller has already resolved the
//! recipient before any mutation is attempted.

use crate::directory::domain::UserId;
use crate::notification::domain::Notification;
use crate::task::domain::{Rating, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// State-changing task event a counterpart is told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent<'a> {
    /// A new task was assigned to the caregiver.
    Assigned {
        /// When the task is scheduled to happen.
        scheduled_for: DateTime<Utc>,
    },
    /// The coordinator moved the task to a new time.
    Rescheduled {
        /// The new scheduled time.
        scheduled_for: DateTime<Utc>,
    },
    /// The caregiver completed the task.
    Completed {
        /// When the task was scheduled to happen.
        scheduled_for: DateTime<Utc>,
    },
    /// The caregiver reported a problem.
    ProblemReported {
        /// The caregiver's problem message.
        message: &'a str,
    },
    /// The task changed to a status with no dedicated wording.
    StatusChanged {
        /// The status the task now holds.
        status: TaskStatus,
    },
    /// The coordinator rated the completed task.
    Rated {
        /// The rating that was given.
        rating: Rating,
    },
    /// The coordinator removed the task.
    Removed,
}

/// Renders a schedule timestamp the way notifications and audit details
/// show it: seconds-precision ISO-8601.
#[must_use]
pub fn format_schedule(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Composes the counterpart-facing message for an event.
#[must_use]
pub fn compose(event: &TaskEvent<'_>) -> String {
    match event {
        TaskEvent::Assigned { scheduled_for } => format!(
            "New task assigned. Date/time: {}",
            format_schedule(*scheduled_for)
        ),
        TaskEvent::Rescheduled { scheduled_for } => format!(
            "A task's time was updated. New date/time: {}",
            format_schedule(*scheduled_for)
        ),
        TaskEvent::Completed { scheduled_for } => format!(
            "A task was completed. Date/time: {}",
            format_schedule(*scheduled_for)
        ),
        TaskEvent::ProblemReported { message } => {
            format!("A task reported a problem: {message}")
        }
        TaskEvent::StatusChanged { status } => {
            format!("A task's status was updated: {status}")
        }
        TaskEvent::Rated { rating } => {
            format!("Your completed task was rated: {rating}/5")
        }
        TaskEvent::Removed => "A task assigned to you was removed.".to_owned(),
    }
}

/// Stamps a notification record for the recipient from an event.
#[must_use]
pub fn dispatch(recipient: UserId, event: &TaskEvent<'_>, clock: &impl Clock) -> Notification {
    Notification::new(recipient, compose(event), clock)
}
