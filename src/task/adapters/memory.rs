//! In-memory task repository for services and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::activity::adapters::memory::InMemoryActivityLog;
use crate::activity::domain::ActivityLogEntry;
use crate::directory::domain::UserId;
use crate::notification::adapters::memory::InMemoryNotificationFeed;
use crate::notification::domain::Notification;
use crate::task::{
    domain::{TaskId, TaskInstance, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Commits hold the single writer lock over the task map for the whole
/// read-validate-write sequence, serialising concurrent commits on the
/// same instance. Side-effect records are appended to the shared feed
/// and log only after the entity write has been validated, so a failed
/// operation leaves neither.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, TaskInstance>>>,
    feed: InMemoryNotificationFeed,
    log: InMemoryActivityLog,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository sharing the given feed and log.
    #[must_use]
    pub fn new(feed: InMemoryNotificationFeed, log: InMemoryActivityLog) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            feed,
            log,
        }
    }

    fn append_effects(
        &self,
        audit: Option<&ActivityLogEntry>,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        if let Some(entry) = audit {
            self.log
                .append(entry.clone())
                .map_err(TaskRepositoryError::persistence)?;
        }
        self.feed
            .append(notice.clone())
            .map_err(TaskRepositoryError::persistence)?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(
        &self,
        task: &TaskInstance,
        audit: &ActivityLogEntry,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        self.append_effects(Some(audit), notice)?;
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(
        &self,
        task: &TaskInstance,
        audit: Option<&ActivityLogEntry>,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        self.append_effects(audit, notice)?;
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn remove(
        &self,
        id: TaskId,
        audit: &ActivityLogEntry,
        notice: &Notification,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.contains_key(&id) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        self.append_effects(Some(audit), notice)?;
        state.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskInstance>> {
        let state = self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&id).cloned())
    }

    async fn list_for_assignee(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<TaskInstance>> {
        let state = self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(collect_sorted(&state, |task| {
            task.assigned_to() == user && status.is_none_or(|wanted| task.status() == wanted)
        }))
    }

    async fn list_created_by(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> TaskRepositoryResult<Vec<TaskInstance>> {
        let state = self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(collect_sorted(&state, |task| {
            task.created_by() == user && status.is_none_or(|wanted| task.status() == wanted)
        }))
    }
}

/// Filters tasks and sorts them by scheduled time, soonest first.
fn collect_sorted(
    state: &HashMap<TaskId, TaskInstance>,
    keep: impl Fn(&TaskInstance) -> bool,
) -> Vec<TaskInstance> {
    let mut tasks: Vec<TaskInstance> = state.values().filter(|task| keep(task)).cloned().collect();
    tasks.sort_by_key(TaskInstance::scheduled_for);
    tasks
}
