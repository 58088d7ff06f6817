//! Template orchestration: authorize, validate, mutate, audit.

use crate::activity::domain::{ActivityAction, ActivityLogEntry, EntityKind};
use crate::authz::{AccessDenied, Operation, authorize};
use crate::directory::{
    domain::{User, UserId},
    ports::{DirectoryError, UserDirectory},
};
use crate::template::{
    domain::{TaskTemplate, TemplateDomainError, TemplateId, TemplateTitle, TimeOfDay},
    ports::{TemplateRepository, TemplateRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTemplateRequest {
    created_by: UserId,
    title: String,
    description: Option<String>,
    default_time: Option<String>,
}

impl CreateTemplateRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(created_by: UserId, title: impl Into<String>) -> Self {
        Self {
            created_by,
            title: title.into(),
            description: None,
            default_time: None,
        }
    }

    /// Sets the template description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default time-of-day in `HH:MM` form.
    #[must_use]
    pub fn with_default_time(mut self, default_time: impl Into<String>) -> Self {
        self.default_time = Some(default_time.into());
        self
    }
}

/// Request payload for updating a template.
///
/// The update replaces all editable fields; omitted options clear their
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTemplateRequest {
    template_id: TemplateId,
    actor: UserId,
    title: String,
    description: Option<String>,
    default_time: Option<String>,
}

impl UpdateTemplateRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(template_id: TemplateId, actor: UserId, title: impl Into<String>) -> Self {
        Self {
            template_id,
            actor,
            title: title.into(),
            description: None,
            default_time: None,
        }
    }

    /// Sets the template description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default time-of-day in `HH:MM` form.
    #[must_use]
    pub fn with_default_time(mut self, default_time: impl Into<String>) -> Self {
        self.default_time = Some(default_time.into());
        self
    }
}

/// Service-level errors for template operations.
#[derive(Debug, Error)]
pub enum TemplateFlowError {
    /// The acting user does not exist in the directory.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The template does not exist.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// Authorization was denied.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TemplateDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TemplateRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for template service operations.
pub type TemplateFlowResult<T> = Result<T, TemplateFlowError>;

/// Template management service.
///
/// Every check runs before any mutation; a failing check aborts the
/// operation with no partial effect, so the audit trail only ever shows
/// mutations that actually happened.
#[derive(Clone)]
pub struct TemplateService<R, U, C>
where
    R: TemplateRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    templates: Arc<R>,
    directory: Arc<U>,
    clock: Arc<C>,
}

impl<R, U, C> TemplateService<R, U, C>
where
    R: TemplateRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new template service.
    #[must_use]
    pub const fn new(templates: Arc<R>, directory: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            templates,
            directory,
            clock,
        }
    }

    /// Creates a template owned by the requesting coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateFlowError`] when the actor is unknown or not a
    /// coordinator, when validation fails, or when persistence rejects
    /// the insert.
    pub async fn create(
        &self,
        request: CreateTemplateRequest,
    ) -> TemplateFlowResult<TaskTemplate> {
        let actor = self.require_user(request.created_by).await?;
        authorize(&actor, Operation::CreateTemplate)?;

        let title = TemplateTitle::new(request.title)?;
        let default_time = parse_default_time(request.default_time.as_deref())?;

        let mut template = TaskTemplate::new(title, actor.id(), &*self.clock);
        if let Some(description) = request.description {
            template = template.with_description(description);
        }
        if let Some(time) = default_time {
            template = template.with_default_time(time);
        }

        let audit = ActivityLogEntry::record(
            actor.id(),
            ActivityAction::CreateTaskTemplate,
            &*self.clock,
        )
        .with_entity(EntityKind::TaskTemplate, template.id().into_inner())
        .with_details(format!("title={}", template.title()));

        self.templates.insert(&template, &audit).await?;
        Ok(template)
    }

    /// Updates a template the actor owns.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateFlowError`] when the template or actor is
    /// unknown, the actor is not the owner, validation fails, or
    /// persistence rejects the update.
    pub async fn update(
        &self,
        request: UpdateTemplateRequest,
    ) -> TemplateFlowResult<TaskTemplate> {
        let mut template = self
            .templates
            .find_by_id(request.template_id)
            .await?
            .ok_or(TemplateFlowError::TemplateNotFound(request.template_id))?;
        let actor = self.require_user(request.actor).await?;
        authorize(
            &actor,
            Operation::UpdateTemplate {
                template: &template,
            },
        )?;

        let title = TemplateTitle::new(request.title)?;
        let default_time = parse_default_time(request.default_time.as_deref())?;
        template.revise(title, request.description, default_time);

        let audit = ActivityLogEntry::record(
            actor.id(),
            ActivityAction::UpdateTaskTemplate,
            &*self.clock,
        )
        .with_entity(EntityKind::TaskTemplate, template.id().into_inner())
        .with_details(format!("title={}", template.title()));

        self.templates.update(&template, &audit).await?;
        Ok(template)
    }

    /// Deletes a template the actor owns.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateFlowError`] when the template or actor is
    /// unknown, the actor is not the owner, or persistence rejects the
    /// removal.
    pub async fn delete(
        &self,
        template_id: TemplateId,
        actor_id: UserId,
    ) -> TemplateFlowResult<()> {
        let template = self
            .templates
            .find_by_id(template_id)
            .await?
            .ok_or(TemplateFlowError::TemplateNotFound(template_id))?;
        let actor = self.require_user(actor_id).await?;
        authorize(
            &actor,
            Operation::DeleteTemplate {
                template: &template,
            },
        )?;

        let audit = ActivityLogEntry::record(
            actor.id(),
            ActivityAction::DeleteTaskTemplate,
            &*self.clock,
        )
        .with_entity(EntityKind::TaskTemplate, template.id().into_inner());

        self.templates.remove(template.id(), &audit).await?;
        Ok(())
    }

    /// Retrieves a template by identifier.
    ///
    /// Returns `Ok(None)` when no such template exists.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateFlowError::Repository`] when the lookup fails.
    pub async fn get(&self, id: TemplateId) -> TemplateFlowResult<Option<TaskTemplate>> {
        Ok(self.templates.find_by_id(id).await?)
    }

    /// Lists every template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateFlowError::Repository`] when the lookup fails.
    pub async fn list(&self) -> TemplateFlowResult<Vec<TaskTemplate>> {
        Ok(self.templates.list().await?)
    }

    /// Lists the templates a coordinator owns.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateFlowError::Repository`] when the lookup fails.
    pub async fn list_for_owner(
        &self,
        owner: UserId,
    ) -> TemplateFlowResult<Vec<TaskTemplate>> {
        Ok(self.templates.list_for_owner(owner).await?)
    }

    async fn require_user(&self, id: UserId) -> TemplateFlowResult<User> {
        self.directory
            .find_user(id)
            .await?
            .ok_or(TemplateFlowError::UserNotFound(id))
    }
}

fn parse_default_time(
    value: Option<&str>,
) -> Result<Option<TimeOfDay>, TemplateDomainError> {
    value.map(TimeOfDay::parse).transpose()
}
