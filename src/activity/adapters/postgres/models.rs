//! Diesel row models for activity log persistence.

use super::schema::activity_log;
use crate::activity::domain::ActivityLogEntry;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activity_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Acting user identifier.
    pub user_id: uuid::Uuid,
    /// Action tag.
    pub action: String,
    /// Optional entity kind.
    pub entity_type: Option<String>,
    /// Optional entity identifier.
    pub entity_id: Option<uuid::Uuid>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Optional free-text details.
    pub details: Option<String>,
}

/// Insert model for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivityLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Acting user identifier.
    pub user_id: uuid::Uuid,
    /// Action tag.
    pub action: String,
    /// Optional entity kind.
    pub entity_type: Option<String>,
    /// Optional entity identifier.
    pub entity_id: Option<uuid::Uuid>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Optional free-text details.
    pub details: Option<String>,
}

impl NewActivityLogRow {
    /// Builds an insert row from a domain audit entry.
    #[must_use]
    pub fn from_entry(entry: &ActivityLogEntry) -> Self {
        Self {
            id: entry.id().into_inner(),
            user_id: entry.user_id().into_inner(),
            action: entry.action().as_str().to_owned(),
            entity_type: entry.entity_type().map(|kind| kind.as_str().to_owned()),
            entity_id: entry.entity_id(),
            recorded_at: entry.timestamp(),
            details: entry.details().map(str::to_owned),
        }
    }
}
