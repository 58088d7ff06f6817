//! Lookup port for the user directory collaborator.

use crate::directory::domain::{User, UserId, UserRole};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// User lookup contract.
///
/// The engine only ever reads from the directory; account creation and
/// credential handling are owned by the excluded authentication layer.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when no such user exists.
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<User>>;

    /// Returns all users holding the given role.
    ///
    /// Used by assignment pickers (list caregivers for a coordinator and
    /// vice versa).
    async fn list_by_role(&self, role: UserRole) -> DirectoryResult<Vec<User>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Persistence-layer failure.
    #[error("directory lookup failed: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
