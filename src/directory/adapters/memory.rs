//! In-memory user directory for services and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::directory::{
    domain::{User, UserId, UserRole},
    ports::{DirectoryError, DirectoryResult, UserDirectory},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Persistence`] when the backing store is
    /// unavailable.
    pub fn insert(&self, user: User) -> DirectoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| DirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        state.insert(user.id(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<User>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.get(&id).cloned())
    }

    async fn list_by_role(&self, role: UserRole) -> DirectoryResult<Vec<User>> {
        let state = self
            .state
            .read()
            .map_err(|err| DirectoryError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state
            .values()
            .filter(|user| user.role() == role)
            .cloned()
            .collect())
    }
}
