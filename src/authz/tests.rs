//! Unit tests for the authorization rule table.

use super::{AccessDenied, Operation, authorize};
use crate::directory::domain::{User, UserRole};
use crate::task::domain::{NewTaskInstance, StatusChange, TaskInstance, TaskStatus};
use crate::template::domain::{TaskTemplate, TemplateId, TemplateTitle};
use chrono::{TimeZone, Utc};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn coordinator(name: &str) -> User {
    User::new(name, UserRole::Coordinator)
}

fn caregiver(name: &str) -> User {
    User::new(name, UserRole::Caregiver)
}

fn template_owned_by(owner: &User, clock: &DefaultClock) -> eyre::Result<TaskTemplate> {
    let title = TemplateTitle::new("Prepare breakfast")?;
    Ok(TaskTemplate::new(title, owner.id(), clock))
}

fn task_between(creator: &User, assignee: &User, clock: &DefaultClock) -> TaskInstance {
    TaskInstance::create(
        NewTaskInstance {
            template_id: TemplateId::new(),
            created_by: creator.id(),
            assigned_to: assignee.id(),
            scheduled_for: Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
            title: None,
            description: None,
        },
        clock,
    )
}

#[rstest]
fn coordinator_may_create_template() {
    let actor = coordinator("Alice");
    assert!(authorize(&actor, Operation::CreateTemplate).is_ok());
}

#[rstest]
fn caregiver_may_not_create_template() {
    let actor = caregiver("Grace");
    let result = authorize(&actor, Operation::CreateTemplate);
    assert_eq!(
        result,
        Err(AccessDenied::RoleMismatch {
            required: UserRole::Coordinator,
            actual: UserRole::Caregiver,
        })
    );
}

#[rstest]
fn template_owner_may_update_and_delete(clock: DefaultClock) -> eyre::Result<()> {
    let owner = coordinator("Alice");
    let template = template_owned_by(&owner, &clock)?;

    ensure!(
        authorize(
            &owner,
            Operation::UpdateTemplate {
                template: &template
            }
        )
        .is_ok()
    );
    ensure!(
        authorize(
            &owner,
            Operation::DeleteTemplate {
                template: &template
            }
        )
        .is_ok()
    );
    Ok(())
}

#[rstest]
fn other_coordinator_may_not_touch_template(clock: DefaultClock) -> eyre::Result<()> {
    let owner = coordinator("Alice");
    let other = coordinator("Carol");
    let template = template_owned_by(&owner, &clock)?;

    let result = authorize(
        &other,
        Operation::UpdateTemplate {
            template: &template,
        },
    );
    if result != Err(AccessDenied::NotOwner { user: other.id() }) {
        bail!("expected NotOwner, got {result:?}");
    }
    Ok(())
}

#[rstest]
fn create_task_requires_coordinator_and_caregiver_pair() {
    let creator = coordinator("Alice");
    let assignee = caregiver("Grace");

    assert!(
        authorize(
            &creator,
            Operation::CreateTask {
                assignee: &assignee
            }
        )
        .is_ok()
    );
}

#[rstest]
fn create_task_rejects_caregiver_creator() {
    let creator = caregiver("Grace");
    let assignee = caregiver("Hana");

    let result = authorize(
        &creator,
        Operation::CreateTask {
            assignee: &assignee,
        },
    );
    assert_eq!(
        result,
        Err(AccessDenied::RoleMismatch {
            required: UserRole::Coordinator,
            actual: UserRole::Caregiver,
        })
    );
}

#[rstest]
fn create_task_rejects_coordinator_assignee() {
    let creator = coordinator("Alice");
    let assignee = coordinator("Carol");

    let result = authorize(
        &creator,
        Operation::CreateTask {
            assignee: &assignee,
        },
    );
    assert_eq!(
        result,
        Err(AccessDenied::RoleMismatch {
            required: UserRole::Caregiver,
            actual: UserRole::Coordinator,
        })
    );
}

#[rstest]
fn task_owner_may_reschedule_and_delete(clock: DefaultClock) {
    let creator = coordinator("Alice");
    let assignee = caregiver("Grace");
    let task = task_between(&creator, &assignee, &clock);

    assert!(authorize(&creator, Operation::RescheduleTask { task: &task }).is_ok());
    assert!(authorize(&creator, Operation::DeleteTask { task: &task }).is_ok());
}

#[rstest]
fn other_coordinator_may_not_reschedule(clock: DefaultClock) {
    let creator = coordinator("Alice");
    let other = coordinator("Carol");
    let assignee = caregiver("Grace");
    let task = task_between(&creator, &assignee, &clock);

    let result = authorize(&other, Operation::RescheduleTask { task: &task });
    assert_eq!(result, Err(AccessDenied::NotOwner { user: other.id() }));
}

#[rstest]
fn assignee_may_update_status(clock: DefaultClock) {
    let creator = coordinator("Alice");
    let assignee = caregiver("Grace");
    let task = task_between(&creator, &assignee, &clock);

    assert!(authorize(&assignee, Operation::UpdateTaskStatus { task: &task }).is_ok());
}

#[rstest]
fn other_caregiver_may_not_update_status(clock: DefaultClock) {
    let creator = coordinator("Alice");
    let assignee = caregiver("Grace");
    let other = caregiver("Hana");
    let task = task_between(&creator, &assignee, &clock);

    let result = authorize(&other, Operation::UpdateTaskStatus { task: &task });
    assert_eq!(result, Err(AccessDenied::NotAssignee { user: other.id() }));
}

#[rstest]
fn coordinator_may_not_update_status(clock: DefaultClock) {
    let creator = coordinator("Alice");
    let assignee = caregiver("Grace");
    let task = task_between(&creator, &assignee, &clock);

    let result = authorize(&creator, Operation::UpdateTaskStatus { task: &task });
    assert_eq!(
        result,
        Err(AccessDenied::RoleMismatch {
            required: UserRole::Caregiver,
            actual: UserRole::Coordinator,
        })
    );
}

#[rstest]
fn rating_requires_done_task(clock: DefaultClock) -> eyre::Result<()> {
    let creator = coordinator("Alice");
    let assignee = caregiver("Grace");
    let mut task = task_between(&creator, &assignee, &clock);

    let pending = authorize(&creator, Operation::RateTask { task: &task });
    if pending
        != Err(AccessDenied::NotDone {
            task: task.id(),
            status: TaskStatus::Pending,
        })
    {
        bail!("expected NotDone, got {pending:?}");
    }

    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    task.apply_status(StatusChange::to(TaskStatus::Done), &clock)?;
    ensure!(authorize(&creator, Operation::RateTask { task: &task }).is_ok());
    Ok(())
}

#[rstest]
fn rating_checks_ownership_before_state(clock: DefaultClock) {
    let creator = coordinator("Alice");
    let other = coordinator("Carol");
    let assignee = caregiver("Grace");
    let task = task_between(&creator, &assignee, &clock);

    let result = authorize(&other, Operation::RateTask { task: &task });
    assert_eq!(result, Err(AccessDenied::NotOwner { user: other.id() }));
}
