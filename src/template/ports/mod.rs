//! Repository port for template persistence and lookup.
//!
//! Mutating operations accept the audit entry describing them so the
//! adapter can commit both in one atomic unit.

use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use crate::template::domain::{TaskTemplate, TemplateId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for template repository operations.
pub type TemplateRepositoryResult<T> = Result<T, TemplateRepositoryError>;

/// Template persistence contract.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Stores a new template together with its audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateRepositoryError::DuplicateTemplate`] when the
    /// template identifier already exists.
    async fn insert(
        &self,
        template: &TaskTemplate,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()>;

    /// Persists changes to an existing template together with the audit
    /// entry describing them.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateRepositoryError::NotFound`] when the template
    /// does not exist.
    async fn update(
        &self,
        template: &TaskTemplate,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()>;

    /// Removes a template together with the audit entry describing the
    /// deletion.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateRepositoryError::NotFound`] when the template
    /// does not exist.
    async fn remove(
        &self,
        id: TemplateId,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()>;

    /// Finds a template by identifier.
    ///
    /// Returns `None` when the template does not exist.
    async fn find_by_id(&self, id: TemplateId) -> TemplateRepositoryResult<Option<TaskTemplate>>;

    /// Returns every stored template.
    async fn list(&self) -> TemplateRepositoryResult<Vec<TaskTemplate>>;

    /// Returns the templates owned by the given coordinator.
    async fn list_for_owner(&self, owner: UserId) -> TemplateRepositoryResult<Vec<TaskTemplate>>;
}

/// Errors returned by template repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TemplateRepositoryError {
    /// A template with the same identifier already exists.
    #[error("duplicate template identifier: {0}")]
    DuplicateTemplate(TemplateId),

    /// The template was not found.
    #[error("template not found: {0}")]
    NotFound(TemplateId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TemplateRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
