//! In-memory activity log for services and tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::activity::{
    domain::ActivityLogEntry,
    ports::{ActivityLogError, ActivityLogRepository, ActivityLogResult},
};
use crate::directory::domain::UserId;

/// Thread-safe in-memory activity log.
///
/// Entries are kept in append (commit) order; listing reverses that
/// order so the newest entry comes first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    state: Arc<RwLock<Vec<ActivityLogEntry>>>,
}

impl InMemoryActivityLog {
    /// Creates an empty in-memory log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry as part of a mutation commit.
    ///
    /// Called by the repository adapters of the mutated entities, never
    /// by services directly.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Persistence`] when the backing store
    /// is unavailable.
    pub fn append(&self, entry: ActivityLogEntry) -> ActivityLogResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ActivityLogError::persistence(std::io::Error::other(err.to_string())))?;
        state.push(entry);
        Ok(())
    }

    /// Returns the total number of recorded entries.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Persistence`] when the backing store
    /// is unavailable.
    pub fn len(&self) -> ActivityLogResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|err| ActivityLogError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state.len())
    }

    /// Returns whether the log is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError::Persistence`] when the backing store
    /// is unavailable.
    pub fn is_empty(&self) -> ActivityLogResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivityLog {
    async fn list_for_actor(&self, user: UserId) -> ActivityLogResult<Vec<ActivityLogEntry>> {
        let state = self
            .state
            .read()
            .map_err(|err| ActivityLogError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(state
            .iter()
            .rev()
            .filter(|entry| entry.user_id() == user)
            .cloned()
            .collect())
    }
}
