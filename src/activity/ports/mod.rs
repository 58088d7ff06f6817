//! Read-side port for the activity audit log.
//!
//! There is deliberately no standalone write operation here: audit
//! entries ride along the repository commit of the mutation they
//! describe, so an entry can never exist for a mutation that did not
//! happen.

use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity log operations.
pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

/// Activity log read contract.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Returns the entries recorded for an actor, newest first.
    async fn list_for_actor(&self, user: UserId) -> ActivityLogResult<Vec<ActivityLogEntry>>;
}

/// Errors returned by activity log implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityLogError {
    /// Persistence-layer failure.
    #[error("activity log unavailable: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
