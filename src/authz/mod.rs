//! Authorization guard for coordinator and caregiver commands.
//!
//! One declarative rule table gates every mutating operation by role and
//! ownership, keeping the task state machine itself free of role logic.
//! The guard is a pure decision function: it consults only the actor's
//! role and the target entity's ownership and assignment fields that the
//! caller has already fetched, and performs no lookups of its own.

use crate::directory::domain::{User, UserId, UserRole};
use crate::task::domain::{TaskId, TaskInstance, TaskStatus};
use crate::template::domain::TaskTemplate;
use thiserror::Error;

/// Operation an actor intends to perform, with the target entity where
/// the rule depends on it.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Create a new task template.
    CreateTemplate,
    /// Update an existing template.
    UpdateTemplate {
        /// Template being updated.
        template: &'a TaskTemplate,
    },
    /// Delete an existing template.
    DeleteTemplate {
        /// Template being deleted.
        template: &'a TaskTemplate,
    },
    /// Create and assign a new task instance.
    CreateTask {
        /// User the task will be assigned to.
        assignee: &'a User,
    },
    /// Move a task instance to a new scheduled time.
    RescheduleTask {
        /// Task being rescheduled.
        task: &'a TaskInstance,
    },
    /// Delete a task instance.
    DeleteTask {
        /// Task being deleted.
        task: &'a TaskInstance,
    },
    /// Change a task instance's status.
    UpdateTaskStatus {
        /// Task being updated.
        task: &'a TaskInstance,
    },
    /// Rate a completed task instance.
    RateTask {
        /// Task being rated.
        task: &'a TaskInstance,
    },
}

/// Denial returned by [`authorize`], with a reason distinguishable
/// enough for callers to map to the right error kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    /// The actor does not hold the role the operation requires.
    #[error("operation requires the {required} role, actor is a {actual}")]
    RoleMismatch {
        /// Role the operation requires.
        required: UserRole,
        /// Role the actor holds.
        actual: UserRole,
    },

    /// The actor does not own the target entity.
    #[error("user {user} does not own the target entity")]
    NotOwner {
        /// The acting user.
        user: UserId,
    },

    /// The task is assigned to a different caregiver.
    #[error("task is not assigned to user {user}")]
    NotAssignee {
        /// The acting user.
        user: UserId,
    },

    /// The task is not in the completed state the operation requires.
    #[error("task {task} is not done (status {status})")]
    NotDone {
        /// The targeted task.
        task: TaskId,
        /// Status the task currently holds.
        status: TaskStatus,
    },
}

/// Decides whether `actor` may perform `operation`.
///
/// # Errors
///
/// Returns [`AccessDenied`] with the first failing requirement; the
/// checks within a rule run in role, ownership, state order.
pub fn authorize(actor: &User, operation: Operation<'_>) -> Result<(), AccessDenied> {
    match operation {
        Operation::CreateTemplate => require_role(actor, UserRole::Coordinator),
        Operation::UpdateTemplate { template } | Operation::DeleteTemplate { template } => {
            require_role(actor, UserRole::Coordinator)?;
            require_owner(actor, template.created_by())
        }
        Operation::CreateTask { assignee } => {
            require_role(actor, UserRole::Coordinator)?;
            require_role(assignee, UserRole::Caregiver)
        }
        Operation::RescheduleTask { task } | Operation::DeleteTask { task } => {
            require_role(actor, UserRole::Coordinator)?;
            require_owner(actor, task.created_by())
        }
        Operation::UpdateTaskStatus { task } => {
            require_role(actor, UserRole::Caregiver)?;
            if task.assigned_to() != actor.id() {
                return Err(AccessDenied::NotAssignee { user: actor.id() });
            }
            Ok(())
        }
        Operation::RateTask { task } => {
            require_role(actor, UserRole::Coordinator)?;
            require_owner(actor, task.created_by())?;
            if task.status() != TaskStatus::Done {
                return Err(AccessDenied::NotDone {
                    task: task.id(),
                    status: task.status(),
                });
            }
            Ok(())
        }
    }
}

fn require_role(user: &User, required: UserRole) -> Result<(), AccessDenied> {
    if user.role() != required {
        return Err(AccessDenied::RoleMismatch {
            required,
            actual: user.role(),
        });
    }
    Ok(())
}

fn require_owner(actor: &User, created_by: UserId) -> Result<(), AccessDenied> {
    if created_by != actor.id() {
        return Err(AccessDenied::NotOwner { user: actor.id() });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
