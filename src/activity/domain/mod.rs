//! Domain model for activity audit entries.

use crate::directory::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLogId(Uuid);

impl ActivityLogId {
    /// Creates a new random entry identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entry identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ActivityLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audit tag for a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// A task instance was created and assigned.
    CreateTask,
    /// A task instance was rescheduled.
    UpdateTask,
    /// A task instance changed status.
    UpdateTaskStatus,
    /// A task instance was deleted.
    DeleteTask,
    /// A task template was created.
    CreateTaskTemplate,
    /// A task template was updated.
    UpdateTaskTemplate,
    /// A task template was deleted.
    DeleteTaskTemplate,
}

impl ActivityAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTask => "CREATE_TASK",
            Self::UpdateTask => "UPDATE_TASK",
            Self::UpdateTaskStatus => "UPDATE_TASK_STATUS",
            Self::DeleteTask => "DELETE_TASK",
            Self::CreateTaskTemplate => "CREATE_TASK_TEMPLATE",
            Self::UpdateTaskTemplate => "UPDATE_TASK_TEMPLATE",
            Self::DeleteTaskTemplate => "DELETE_TASK_TEMPLATE",
        }
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ParseActivityActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "CREATE_TASK" => Ok(Self::CreateTask),
            "UPDATE_TASK" => Ok(Self::UpdateTask),
            "UPDATE_TASK_STATUS" => Ok(Self::UpdateTaskStatus),
            "DELETE_TASK" => Ok(Self::DeleteTask),
            "CREATE_TASK_TEMPLATE" => Ok(Self::CreateTaskTemplate),
            "UPDATE_TASK_TEMPLATE" => Ok(Self::UpdateTaskTemplate),
            "DELETE_TASK_TEMPLATE" => Ok(Self::DeleteTaskTemplate),
            _ => Err(ParseActivityActionError(value.to_owned())),
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing action tags from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity action: {0}")]
pub struct ParseActivityActionError(pub String);

/// Kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A scheduled, assigned task occurrence.
    TaskInstance,
    /// A reusable task definition.
    TaskTemplate,
}

impl EntityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskInstance => "TaskInstance",
            Self::TaskTemplate => "TaskTemplate",
        }
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = ParseEntityKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "TaskInstance" => Ok(Self::TaskInstance),
            "TaskTemplate" => Ok(Self::TaskTemplate),
            _ => Err(ParseEntityKindError(value.to_owned())),
        }
    }
}

/// Error returned while parsing entity kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entity kind: {0}")]
pub struct ParseEntityKindError(pub String);

/// Append-only record of a successful mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    id: ActivityLogId,
    user_id: UserId,
    action: ActivityAction,
    entity_type: Option<EntityKind>,
    entity_id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    details: Option<String>,
}

/// Parameter object for reconstructing a persisted audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActivityData {
    /// Persisted entry identifier.
    pub id: ActivityLogId,
    /// Persisted actor identifier.
    pub user_id: UserId,
    /// Persisted action tag.
    pub action: ActivityAction,
    /// Persisted entity kind, if any.
    pub entity_type: Option<EntityKind>,
    /// Persisted entity identifier, if any.
    pub entity_id: Option<Uuid>,
    /// Persisted recording timestamp.
    pub timestamp: DateTime<Utc>,
    /// Persisted free-text details, if any.
    pub details: Option<String>,
}

impl ActivityLogEntry {
    /// Records a new audit entry for an actor and action.
    #[must_use]
    pub fn record(actor: UserId, action: ActivityAction, clock: &impl Clock) -> Self {
        Self {
            id: ActivityLogId::new(),
            user_id: actor,
            action,
            entity_type: None,
            entity_id: None,
            timestamp: clock.utc(),
            details: None,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            action: data.action,
            entity_type: data.entity_type,
            entity_id: data.entity_id,
            timestamp: data.timestamp,
            details: data.details,
        }
    }

    /// Attaches the entity the action operated on.
    #[must_use]
    pub fn with_entity(mut self, kind: EntityKind, id: Uuid) -> Self {
        self.entity_type = Some(kind);
        self.entity_id = Some(id);
        self
    }

    /// Attaches free-text details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityLogId {
        self.id
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the action tag.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.action
    }

    /// Returns the entity kind, if recorded.
    #[must_use]
    pub const fn entity_type(&self) -> Option<EntityKind> {
        self.entity_type
    }

    /// Returns the entity identifier, if recorded.
    #[must_use]
    pub const fn entity_id(&self) -> Option<Uuid> {
        self.entity_id
    }

    /// Returns the recording timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the free-text details, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}
