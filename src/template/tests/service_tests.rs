//! Service orchestration tests for template management.

use std::sync::Arc;

use crate::activity::adapters::memory::InMemoryActivityLog;
use crate::activity::domain::ActivityAction;
use crate::activity::ports::ActivityLogRepository;
use crate::authz::AccessDenied;
use crate::directory::adapters::memory::InMemoryUserDirectory;
use crate::directory::domain::{User, UserId, UserRole};
use crate::template::adapters::memory::InMemoryTemplateRepository;
use crate::template::domain::{TemplateDomainError, TemplateId};
use crate::template::services::{
    CreateTemplateRequest, TemplateFlowError, TemplateService, UpdateTemplateRequest,
};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;

type Service = TemplateService<InMemoryTemplateRepository, InMemoryUserDirectory, DefaultClock>;

struct Harness {
    service: Service,
    log: InMemoryActivityLog,
    directory: InMemoryUserDirectory,
    coordinator: User,
    caregiver: User,
}

fn harness() -> eyre::Result<Harness> {
    let directory = InMemoryUserDirectory::new();
    let coordinator = User::new("Alice", UserRole::Coordinator);
    let caregiver = User::new("Grace", UserRole::Caregiver);
    directory.insert(coordinator.clone())?;
    directory.insert(caregiver.clone())?;

    let log = InMemoryActivityLog::new();
    let service = TemplateService::new(
        Arc::new(InMemoryTemplateRepository::new(log.clone())),
        Arc::new(directory.clone()),
        Arc::new(DefaultClock),
    );

    Ok(Harness {
        service,
        log,
        directory,
        coordinator,
        caregiver,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_persists_template_and_audits() -> eyre::Result<()> {
    let h = harness()?;

    let template = h
        .service
        .create(
            CreateTemplateRequest::new(h.coordinator.id(), "Prepare breakfast")
                .with_description("Porridge, no sugar")
                .with_default_time("08:30"),
        )
        .await?;

    ensure!(template.title().as_str() == "Prepare breakfast");
    ensure!(template.description() == Some("Porridge, no sugar"));
    ensure!(template.default_time().map(|t| t.to_string()) == Some("08:30".to_owned()));
    ensure!(template.is_active());

    let fetched = h.service.get(template.id()).await?;
    ensure!(fetched.as_ref() == Some(&template));

    let audit = h.log.list_for_actor(h.coordinator.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries recorded");
    };
    ensure!(head.action() == ActivityAction::CreateTaskTemplate);
    ensure!(head.entity_id() == Some(template.id().into_inner()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_caregiver_without_effects() -> eyre::Result<()> {
    let h = harness()?;
    let log_before = h.log.len()?;

    let result = h
        .service
        .create(CreateTemplateRequest::new(h.caregiver.id(), "Prepare breakfast"))
        .await;

    ensure!(matches!(
        result,
        Err(TemplateFlowError::Forbidden(AccessDenied::RoleMismatch { .. }))
    ));
    ensure!(h.log.len()? == log_before);
    ensure!(h.service.list().await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_unknown_actor() -> eyre::Result<()> {
    let h = harness()?;
    let missing = UserId::new();

    let result = h
        .service
        .create(CreateTemplateRequest::new(missing, "Prepare breakfast"))
        .await;

    ensure!(matches!(
        result,
        Err(TemplateFlowError::UserNotFound(id)) if id == missing
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_bad_default_time() -> eyre::Result<()> {
    let h = harness()?;

    let result = h
        .service
        .create(
            CreateTemplateRequest::new(h.coordinator.id(), "Prepare breakfast")
                .with_default_time("half past eight"),
        )
        .await;

    ensure!(matches!(
        result,
        Err(TemplateFlowError::Domain(
            TemplateDomainError::InvalidTimeOfDay(_)
        ))
    ));
    ensure!(h.service.list().await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_revises_fields_and_clears_omitted_options() -> eyre::Result<()> {
    let h = harness()?;
    let template = h
        .service
        .create(
            CreateTemplateRequest::new(h.coordinator.id(), "Prepare breakfast")
                .with_description("Porridge, no sugar")
                .with_default_time("08:30"),
        )
        .await?;

    let updated = h
        .service
        .update(UpdateTemplateRequest::new(
            template.id(),
            h.coordinator.id(),
            "Prepare lunch",
        ))
        .await?;

    ensure!(updated.title().as_str() == "Prepare lunch");
    ensure!(updated.description().is_none());
    ensure!(updated.default_time().is_none());

    let audit = h.log.list_for_actor(h.coordinator.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries recorded");
    };
    ensure!(head.action() == ActivityAction::UpdateTaskTemplate);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_non_owner() -> eyre::Result<()> {
    let h = harness()?;
    let other = User::new("Carol", UserRole::Coordinator);
    h.directory.insert(other.clone())?;
    let template = h
        .service
        .create(CreateTemplateRequest::new(h.coordinator.id(), "Prepare breakfast"))
        .await?;

    let result = h
        .service
        .update(UpdateTemplateRequest::new(
            template.id(),
            other.id(),
            "Hijacked",
        ))
        .await;

    ensure!(matches!(
        result,
        Err(TemplateFlowError::Forbidden(AccessDenied::NotOwner { .. }))
    ));
    let Some(unchanged) = h.service.get(template.id()).await? else {
        bail!("template disappeared");
    };
    ensure!(unchanged.title().as_str() == "Prepare breakfast");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_unknown_template() -> eyre::Result<()> {
    let h = harness()?;
    let missing = TemplateId::new();

    let result = h
        .service
        .update(UpdateTemplateRequest::new(
            missing,
            h.coordinator.id(),
            "Prepare lunch",
        ))
        .await;

    ensure!(matches!(
        result,
        Err(TemplateFlowError::TemplateNotFound(id)) if id == missing
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_owned_template() -> eyre::Result<()> {
    let h = harness()?;
    let template = h
        .service
        .create(CreateTemplateRequest::new(h.coordinator.id(), "Prepare breakfast"))
        .await?;

    h.service.delete(template.id(), h.coordinator.id()).await?;

    ensure!(h.service.get(template.id()).await?.is_none());
    let audit = h.log.list_for_actor(h.coordinator.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries recorded");
    };
    ensure!(head.action() == ActivityAction::DeleteTaskTemplate);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_by_owner_filters_templates() -> eyre::Result<()> {
    let h = harness()?;
    let other = User::new("Carol", UserRole::Coordinator);
    h.directory.insert(other.clone())?;
    h.service
        .create(CreateTemplateRequest::new(h.coordinator.id(), "Prepare breakfast"))
        .await?;
    h.service
        .create(CreateTemplateRequest::new(other.id(), "Evening walk"))
        .await?;

    ensure!(h.service.list().await?.len() == 2);
    let owned = h.service.list_for_owner(other.id()).await?;
    ensure!(owned.len() == 1);
    ensure!(owned.first().map(|t| t.title().as_str()) == Some("Evening walk"));
    Ok(())
}
