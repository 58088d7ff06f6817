//! Service orchestration tests for the task lifecycle engine.
//!
//! Each test drives the public service API against the in-memory
//! adapters and checks both the returned entity and the side-effect
//! trail: exactly one audit entry and one counterpart notification per
//! successful mutation, none for a failed one.

use std::sync::Arc;

use crate::activity::adapters::memory::InMemoryActivityLog;
use crate::activity::domain::ActivityAction;
use crate::activity::ports::ActivityLogRepository;
use crate::authz::AccessDenied;
use crate::directory::adapters::memory::InMemoryUserDirectory;
use crate::directory::domain::{User, UserId, UserRole};
use crate::notification::adapters::memory::InMemoryNotificationFeed;
use crate::notification::ports::NotificationRepository;
use crate::task::adapters::memory::InMemoryTaskRepository;
use crate::task::domain::{ProblemSeverity, Rating, TaskDomainError, TaskId, TaskStatus};
use crate::task::services::{
    CreateTaskRequest, RateTaskRequest, TaskLifecycleError, TaskLifecycleService,
    UpdateStatusRequest,
};
use crate::template::adapters::memory::InMemoryTemplateRepository;
use crate::template::domain::TemplateId;
use crate::template::services::{CreateTemplateRequest, TemplateService};
use chrono::{DateTime, TimeZone, Utc};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;

type Service = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryTemplateRepository,
    InMemoryUserDirectory,
    DefaultClock,
>;

struct Harness {
    service: Service,
    feed: InMemoryNotificationFeed,
    log: InMemoryActivityLog,
    directory: InMemoryUserDirectory,
    coordinator: User,
    caregiver: User,
    template_id: TemplateId,
}

fn schedule() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap()
}

async fn harness() -> eyre::Result<Harness> {
    let directory = InMemoryUserDirectory::new();
    let coordinator = User::new("Alice", UserRole::Coordinator);
    let caregiver = User::new("Grace", UserRole::Caregiver);
    directory.insert(coordinator.clone())?;
    directory.insert(caregiver.clone())?;

    let feed = InMemoryNotificationFeed::new();
    let log = InMemoryActivityLog::new();
    let templates = Arc::new(InMemoryTemplateRepository::new(log.clone()));
    let tasks = Arc::new(InMemoryTaskRepository::new(feed.clone(), log.clone()));

    let template_service = TemplateService::new(
        Arc::clone(&templates),
        Arc::new(directory.clone()),
        Arc::new(DefaultClock),
    );
    let template = template_service
        .create(CreateTemplateRequest::new(coordinator.id(), "Morning medication"))
        .await?;

    let service = TaskLifecycleService::new(
        tasks,
        templates,
        Arc::new(directory.clone()),
        Arc::new(DefaultClock),
    );

    Ok(Harness {
        service,
        feed,
        log,
        directory,
        coordinator,
        caregiver,
        template_id: template.id(),
    })
}

impl Harness {
    fn create_request(&self) -> CreateTaskRequest {
        CreateTaskRequest::new(
            self.template_id,
            self.coordinator.id(),
            self.caregiver.id(),
            schedule(),
        )
    }

    async fn created_task(&self) -> eyre::Result<TaskId> {
        let task = self.service.create_task(self.create_request()).await?;
        Ok(task.id())
    }

    /// Drives a created task to `done` through the caregiver.
    async fn done_task(&self) -> eyre::Result<TaskId> {
        let task_id = self.created_task().await?;
        self.service
            .update_status(UpdateStatusRequest::new(
                task_id,
                self.caregiver.id(),
                TaskStatus::InProgress,
            ))
            .await?;
        self.service
            .update_status(UpdateStatusRequest::new(
                task_id,
                self.caregiver.id(),
                TaskStatus::Done,
            ))
            .await?;
        Ok(task_id)
    }

    async fn notification_count(&self, user: UserId) -> eyre::Result<usize> {
        Ok(self.feed.list_for_user(user).await?.len())
    }

    async fn latest_notification(&self, user: UserId) -> eyre::Result<String> {
        let feed = self.feed.list_for_user(user).await?;
        let Some(head) = feed.first() else {
            bail!("no notifications for {user}");
        };
        Ok(head.message().to_owned())
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_starts_pending_and_notifies_assignee() -> eyre::Result<()> {
    let h = harness().await?;

    let task = h.service.create_task(h.create_request()).await?;

    ensure!(task.status() == TaskStatus::Pending);
    ensure!(task.created_by() == h.coordinator.id());
    ensure!(task.assigned_to() == h.caregiver.id());

    let message = h.latest_notification(h.caregiver.id()).await?;
    ensure!(message.contains("New task assigned"));
    ensure!(message.contains("2025-01-10T09:00"));

    let audit = h.log.list_for_actor(h.coordinator.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries recorded");
    };
    ensure!(head.action() == ActivityAction::CreateTask);
    ensure!(head.entity_id() == Some(task.id().into_inner()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_caregiver_creator_without_effects() -> eyre::Result<()> {
    let h = harness().await?;
    let log_before = h.log.len()?;

    let request = CreateTaskRequest::new(
        h.template_id,
        h.caregiver.id(),
        h.caregiver.id(),
        schedule(),
    );
    let result = h.service.create_task(request).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Forbidden(AccessDenied::RoleMismatch {
            required: UserRole::Coordinator,
            ..
        }))
    ));
    ensure!(h.log.len()? == log_before);
    ensure!(h.notification_count(h.caregiver.id()).await? == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_rejects_coordinator_assignee() -> eyre::Result<()> {
    let h = harness().await?;

    let request = CreateTaskRequest::new(
        h.template_id,
        h.coordinator.id(),
        h.coordinator.id(),
        schedule(),
    );
    let result = h.service.create_task(request).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Forbidden(AccessDenied::RoleMismatch {
            required: UserRole::Caregiver,
            ..
        }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_requires_known_template() -> eyre::Result<()> {
    let h = harness().await?;
    let missing = TemplateId::new();

    let request = CreateTaskRequest::new(
        missing,
        h.coordinator.id(),
        h.caregiver.id(),
        schedule(),
    );
    let result = h.service.create_task(request).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::TemplateNotFound(id)) if id == missing
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_requires_known_assignee() -> eyre::Result<()> {
    let h = harness().await?;
    let missing = UserId::new();

    let request =
        CreateTaskRequest::new(h.template_id, h.coordinator.id(), missing, schedule());
    let result = h.service.create_task(request).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::UserNotFound(id)) if id == missing
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_update_by_other_caregiver_leaves_task_unchanged() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    let other = User::new("Hana", UserRole::Caregiver);
    h.directory.insert(other.clone())?;
    let log_before = h.log.len()?;

    let result = h
        .service
        .update_status(UpdateStatusRequest::new(
            task_id,
            other.id(),
            TaskStatus::InProgress,
        ))
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Forbidden(AccessDenied::NotAssignee { .. }))
    ));
    let Some(task) = h.service.get_task(task_id).await? else {
        bail!("task disappeared");
    };
    ensure!(task.status() == TaskStatus::Pending);
    ensure!(h.log.len()? == log_before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_transition_produces_no_side_effects() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    let log_before = h.log.len()?;
    let coordinator_feed_before = h.notification_count(h.coordinator.id()).await?;

    let result = h
        .service
        .update_status(UpdateStatusRequest::new(
            task_id,
            h.caregiver.id(),
            TaskStatus::Done,
        ))
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::InvalidStatusTransition { .. }
        ))
    ));
    ensure!(h.log.len()? == log_before);
    ensure!(h.notification_count(h.coordinator.id()).await? == coordinator_feed_before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn problem_report_notifies_coordinator_with_message() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    h.service
        .update_status(UpdateStatusRequest::new(
            task_id,
            h.caregiver.id(),
            TaskStatus::InProgress,
        ))
        .await?;

    let task = h
        .service
        .update_status(
            UpdateStatusRequest::new(task_id, h.caregiver.id(), TaskStatus::Problem)
                .with_problem_message("medication missing")
                .with_problem_severity(ProblemSeverity::Critical),
        )
        .await?;

    ensure!(task.status() == TaskStatus::Problem);
    ensure!(task.problem_message() == Some("medication missing"));
    ensure!(task.problem_severity() == Some(ProblemSeverity::Critical));

    let message = h.latest_notification(h.coordinator.id()).await?;
    ensure!(message.contains("problem"));
    ensure!(message.contains("medication missing"));

    let audit = h.log.list_for_actor(h.caregiver.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries for caregiver");
    };
    ensure!(head.action() == ActivityAction::UpdateTaskStatus);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reschedule_reopens_problem_task() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    h.service
        .update_status(UpdateStatusRequest::new(
            task_id,
            h.caregiver.id(),
            TaskStatus::InProgress,
        ))
        .await?;
    h.service
        .update_status(
            UpdateStatusRequest::new(task_id, h.caregiver.id(), TaskStatus::Problem)
                .with_problem_message("medication missing"),
        )
        .await?;
    let new_time = Utc.with_ymd_and_hms(2025, 1, 11, 9, 0, 0).unwrap();

    let task = h
        .service
        .reschedule_task(task_id, h.coordinator.id(), new_time)
        .await?;

    ensure!(task.status() == TaskStatus::Pending);
    ensure!(task.scheduled_for() == new_time);

    let message = h.latest_notification(h.caregiver.id()).await?;
    ensure!(message.contains("time was updated"));
    ensure!(message.contains("2025-01-11T09:00"));

    let audit = h.log.list_for_actor(h.coordinator.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries for coordinator");
    };
    ensure!(head.action() == ActivityAction::UpdateTask);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reschedule_to_same_time_fails_without_effects() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    let log_before = h.log.len()?;
    let feed_before = h.notification_count(h.caregiver.id()).await?;

    let result = h
        .service
        .reschedule_task(task_id, h.coordinator.id(), schedule())
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::UnchangedSchedule { .. }
        ))
    ));
    ensure!(h.log.len()? == log_before);
    ensure!(h.notification_count(h.caregiver.id()).await? == feed_before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reschedule_requires_task_ownership() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    let other = User::new("Carol", UserRole::Coordinator);
    h.directory.insert(other.clone())?;

    let result = h
        .service
        .reschedule_task(
            task_id,
            other.id(),
            Utc.with_ymd_and_hms(2025, 1, 12, 9, 0, 0).unwrap(),
        )
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Forbidden(AccessDenied::NotOwner { .. }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_can_be_rated_once_done() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.done_task().await?;
    let log_before = h.log.len()?;

    let task = h
        .service
        .rate_task(
            RateTaskRequest::new(task_id, h.coordinator.id(), 5)
                .with_review_note("spotless work"),
        )
        .await?;

    ensure!(task.rating() == Some(Rating::new(5)?));
    ensure!(task.review_note() == Some("spotless work"));

    let message = h.latest_notification(h.caregiver.id()).await?;
    ensure!(message.contains("rated: 5/5"));

    // Rating notifies the caregiver but writes no audit entry.
    ensure!(h.log.len()? == log_before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_rating_leaves_rating_unset() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.done_task().await?;
    let feed_before = h.notification_count(h.caregiver.id()).await?;

    let result = h
        .service
        .rate_task(RateTaskRequest::new(task_id, h.coordinator.id(), 6))
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::InvalidRating(6)))
    ));
    let Some(task) = h.service.get_task(task_id).await? else {
        bail!("task disappeared");
    };
    ensure!(task.rating().is_none());
    ensure!(h.notification_count(h.caregiver.id()).await? == feed_before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rating_a_pending_task_is_denied_by_state() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;

    let result = h
        .service
        .rate_task(RateTaskRequest::new(task_id, h.coordinator.id(), 3))
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Forbidden(AccessDenied::NotDone { .. }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_task_removes_and_notifies_assignee() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;

    h.service.delete_task(task_id, h.coordinator.id()).await?;

    ensure!(h.service.get_task(task_id).await?.is_none());
    let message = h.latest_notification(h.caregiver.id()).await?;
    ensure!(message.contains("removed"));

    let audit = h.log.list_for_actor(h.coordinator.id()).await?;
    let Some(head) = audit.first() else {
        bail!("no audit entries for coordinator");
    };
    ensure!(head.action() == ActivityAction::DeleteTask);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_requires_task_ownership() -> eyre::Result<()> {
    let h = harness().await?;
    let task_id = h.created_task().await?;
    let other = User::new("Carol", UserRole::Coordinator);
    h.directory.insert(other.clone())?;

    let result = h.service.delete_task(task_id, other.id()).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Forbidden(AccessDenied::NotOwner { .. }))
    ));
    ensure!(h.service.get_task(task_id).await?.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_sorts_by_schedule_and_filters_by_status() -> eyre::Result<()> {
    let h = harness().await?;
    let later = h
        .service
        .create_task(h.create_request())
        .await?;
    let earlier = h
        .service
        .create_task(
            CreateTaskRequest::new(
                h.template_id,
                h.coordinator.id(),
                h.caregiver.id(),
                Utc.with_ymd_and_hms(2025, 1, 9, 8, 0, 0).unwrap(),
            )
            .with_title("Early round"),
        )
        .await?;
    h.service
        .update_status(UpdateStatusRequest::new(
            earlier.id(),
            h.caregiver.id(),
            TaskStatus::InProgress,
        ))
        .await?;

    let assigned = h.service.list_assigned(h.caregiver.id(), None).await?;
    ensure!(assigned.len() == 2);
    ensure!(assigned.first().map(crate::task::domain::TaskInstance::id) == Some(earlier.id()));
    ensure!(assigned.get(1).map(crate::task::domain::TaskInstance::id) == Some(later.id()));

    let in_progress = h
        .service
        .list_assigned(h.caregiver.id(), Some(TaskStatus::InProgress))
        .await?;
    ensure!(in_progress.len() == 1);

    let created = h.service.list_created(h.coordinator.id(), None).await?;
    ensure!(created.len() == 2);
    Ok(())
}
