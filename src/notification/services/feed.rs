//! Feed service: list notifications and manage read flags.

use crate::directory::{
    domain::UserId,
    ports::{DirectoryError, UserDirectory},
};
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for feed operations.
#[derive(Debug, Error)]
pub enum NotificationFeedError {
    /// The requested user does not exist in the directory.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] NotificationRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for feed service operations.
pub type NotificationFeedResult<T> = Result<T, NotificationFeedError>;

/// Read-side service over a user's notification feed.
#[derive(Clone)]
pub struct NotificationFeedService<N, U>
where
    N: NotificationRepository,
    U: UserDirectory,
{
    notifications: Arc<N>,
    directory: Arc<U>,
}

impl<N, U> NotificationFeedService<N, U>
where
    N: NotificationRepository,
    U: UserDirectory,
{
    /// Creates a new feed service.
    #[must_use]
    pub const fn new(notifications: Arc<N>, directory: Arc<U>) -> Self {
        Self {
            notifications,
            directory,
        }
    }

    /// Returns a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationFeedError::UserNotFound`] when the user is
    /// unknown and repository errors otherwise.
    pub async fn list_for_user(
        &self,
        user: UserId,
    ) -> NotificationFeedResult<Vec<Notification>> {
        self.require_user(user).await?;
        Ok(self.notifications.list_for_user(user).await?)
    }

    /// Marks one notification as read and returns it.
    ///
    /// Idempotent on already-read notifications.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationFeedError::Repository`] when the
    /// notification does not exist or persistence fails.
    pub async fn mark_read(
        &self,
        id: NotificationId,
    ) -> NotificationFeedResult<Notification> {
        Ok(self.notifications.mark_read(id).await?)
    }

    /// Marks a user's entire feed as read and returns it, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationFeedError::UserNotFound`] when the user is
    /// unknown and repository errors otherwise.
    pub async fn mark_all_read(
        &self,
        user: UserId,
    ) -> NotificationFeedResult<Vec<Notification>> {
        self.require_user(user).await?;
        Ok(self.notifications.mark_all_read(user).await?)
    }

    async fn require_user(&self, user: UserId) -> NotificationFeedResult<()> {
        self.directory
            .find_user(user)
            .await?
            .ok_or(NotificationFeedError::UserNotFound(user))?;
        Ok(())
    }
}
