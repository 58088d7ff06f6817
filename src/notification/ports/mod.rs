//! Repository port for the notification feed.
//!
//! There is no standalone create operation: notification records ride
//! along the repository commit of the task mutation that produced them.

use crate::directory::domain::UserId;
use crate::notification::domain::{Notification, NotificationId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Notification feed persistence contract.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Returns a user's notifications, newest first.
    async fn list_for_user(&self, user: UserId)
    -> NotificationRepositoryResult<Vec<Notification>>;

    /// Marks a single notification as read and returns it.
    ///
    /// Idempotent: marking an already-read notification succeeds without
    /// further effect.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when the
    /// notification does not exist.
    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<Notification>;

    /// Marks every notification of a user as read and returns the
    /// refreshed feed, newest first.
    async fn mark_all_read(&self, user: UserId)
    -> NotificationRepositoryResult<Vec<Notification>>;
}

/// Errors returned by notification repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// The notification was not found.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
