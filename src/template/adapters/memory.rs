//! In-memory template repository for services and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::activity::adapters::memory::InMemoryActivityLog;
use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use crate::template::{
    domain::{TaskTemplate, TemplateId},
    ports::{TemplateRepository, TemplateRepositoryError, TemplateRepositoryResult},
};

/// Thread-safe in-memory template repository.
///
/// Audit entries accepted with a mutation are appended to the shared
/// activity log only after the mutation itself has been validated, so a
/// failed operation leaves no trace.
#[derive(Debug, Clone)]
pub struct InMemoryTemplateRepository {
    state: Arc<RwLock<HashMap<TemplateId, TaskTemplate>>>,
    log: InMemoryActivityLog,
}

impl InMemoryTemplateRepository {
    /// Creates an empty repository sharing the given activity log.
    #[must_use]
    pub fn new(log: InMemoryActivityLog) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            log,
        }
    }

    fn append_audit(&self, audit: &ActivityLogEntry) -> TemplateRepositoryResult<()> {
        self.log
            .append(audit.clone())
            .map_err(TemplateRepositoryError::persistence)
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn insert(
        &self,
        template: &TaskTemplate,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.contains_key(&template.id()) {
            return Err(TemplateRepositoryError::DuplicateTemplate(template.id()));
        }
        self.append_audit(audit)?;
        state.insert(template.id(), template.clone());
        Ok(())
    }

    async fn update(
        &self,
        template: &TaskTemplate,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.contains_key(&template.id()) {
            return Err(TemplateRepositoryError::NotFound(template.id()));
        }
        self.append_audit(audit)?;
        state.insert(template.id(), template.clone());
        Ok(())
    }

    async fn remove(
        &self,
        id: TemplateId,
        audit: &ActivityLogEntry,
    ) -> TemplateRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.contains_key(&id) {
            return Err(TemplateRepositoryError::NotFound(id));
        }
        self.append_audit(audit)?;
        state.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: TemplateId) -> TemplateRepositoryResult<Option<TaskTemplate>> {
        let state = self.state.read().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&id).cloned())
    }

    async fn list(&self) -> TemplateRepositoryResult<Vec<TaskTemplate>> {
        let state = self.state.read().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut templates: Vec<TaskTemplate> = state.values().cloned().collect();
        templates.sort_by_key(TaskTemplate::created_at);
        Ok(templates)
    }

    async fn list_for_owner(&self, owner: UserId) -> TemplateRepositoryResult<Vec<TaskTemplate>> {
        let state = self.state.read().map_err(|err| {
            TemplateRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut templates: Vec<TaskTemplate> = state
            .values()
            .filter(|template| template.created_by() == owner)
            .cloned()
            .collect();
        templates.sort_by_key(TaskTemplate::created_at);
        Ok(templates)
    }
}
