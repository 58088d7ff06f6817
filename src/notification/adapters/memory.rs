//! In-memory notification feed for services and tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::directory::domain::UserId;
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult},
};

/// Thread-safe in-memory notification feed.
///
/// Records are kept in append (commit) order; listing reverses that
/// order so the newest notification comes first even when two commits
/// share a timestamp.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationFeed {
    state: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationFeed {
    /// Creates an empty in-memory feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record as part of a mutation commit.
    ///
    /// Called by the repository adapters of the mutated entities, never
    /// by services directly.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::Persistence`] when the
    /// backing store is unavailable.
    pub fn append(&self, notification: Notification) -> NotificationRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.push(notification);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationFeed {
    async fn list_for_user(
        &self,
        user: UserId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let state = self.state.read().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .iter()
            .rev()
            .filter(|notification| notification.user_id() == user)
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Notification> {
        let mut state = self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let notification = state
            .iter_mut()
            .find(|notification| notification.id() == id)
            .ok_or(NotificationRepositoryError::NotFound(id))?;
        notification.mark_read();
        Ok(notification.clone())
    }

    async fn mark_all_read(
        &self,
        user: UserId,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let mut state = self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        for notification in state
            .iter_mut()
            .filter(|notification| notification.user_id() == user)
        {
            notification.mark_read();
        }
        Ok(state
            .iter()
            .rev()
            .filter(|notification| notification.user_id() == user)
            .cloned()
            .collect())
    }
}
