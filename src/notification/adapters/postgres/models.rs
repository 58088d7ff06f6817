//! Diesel row models for notification persistence.

use super::schema::notifications;
use crate::notification::domain::Notification;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for notification records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient user identifier.
    pub user_id: uuid::Uuid,
    /// Message text.
    pub message: String,
    /// Read flag.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Recipient user identifier.
    pub user_id: uuid::Uuid,
    /// Message text.
    pub message: String,
    /// Read flag.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewNotificationRow {
    /// Builds an insert row from a domain notification.
    #[must_use]
    pub fn from_record(notification: &Notification) -> Self {
        Self {
            id: notification.id().into_inner(),
            user_id: notification.user_id().into_inner(),
            message: notification.message().to_owned(),
            is_read: notification.is_read(),
            created_at: notification.created_at(),
        }
    }
}
