//! Domain model for task templates.

use crate::directory::domain::UserId;
use chrono::{DateTime, NaiveTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a task template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(Uuid);

impl TemplateId {
    /// Creates a new random template identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a template identifier from an existing UUID.
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

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned while constructing template domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateDomainError {
    /// The template title is empty after trimming.
    #[error("template title must not be empty")]
    EmptyTitle,

    /// The default time does not follow the `HH:MM` format.
    #[error("invalid default time '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),
}

/// Validated, non-empty template title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateTitle(String);

impl TemplateTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateDomainError::EmptyTitle`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TemplateDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TemplateDomainError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TemplateTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TemplateTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default time-of-day applied when scheduling instances from a
/// template, in `HH:MM` wall-clock form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Parses an `HH:MM` value.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateDomainError::InvalidTimeOfDay`] when the value
    /// does not parse.
    pub fn parse(value: &str) -> Result<Self, TemplateDomainError> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| TemplateDomainError::InvalidTimeOfDay(value.to_owned()))
    }

    /// Returns the wrapped wall-clock time.
    #[must_use]
    pub const fn into_inner(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Task template aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    id: TemplateId,
    title: TemplateTitle,
    description: Option<String>,
    default_time: Option<TimeOfDay>,
    created_by: UserId,
    is_active: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTemplateData {
    /// Persisted template identifier.
    pub id: TemplateId,
    /// Persisted title.
    pub title: TemplateTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted default time, if any.
    pub default_time: Option<TimeOfDay>,
    /// Persisted owner identifier.
    pub created_by: UserId,
    /// Persisted active flag.
    pub is_active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskTemplate {
    /// Creates a new active template owned by the given coordinator.
    #[must_use]
    pub fn new(title: TemplateTitle, created_by: UserId, clock: &impl Clock) -> Self {
        Self {
            id: TemplateId::new(),
            title,
            description: None,
            default_time: None,
            created_by,
            is_active: true,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a template from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTemplateData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            default_time: data.default_time,
            created_by: data.created_by,
            is_active: data.is_active,
            created_at: data.created_at,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default time-of-day.
    #[must_use]
    pub fn with_default_time(mut self, default_time: TimeOfDay) -> Self {
        self.default_time = Some(default_time);
        self
    }

    /// Replaces the editable fields in one sweep, mirroring a full
    /// template update.
    pub fn revise(
        &mut self,
        title: TemplateTitle,
        description: Option<String>,
        default_time: Option<TimeOfDay>,
    ) {
        self.title = title;
        self.description = description;
        self.default_time = default_time;
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TemplateTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the default time-of-day, if any.
    #[must_use]
    pub const fn default_time(&self) -> Option<TimeOfDay> {
        self.default_time
    }

    /// Returns the owning coordinator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns whether the template is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
