//! Unit tests for task instance domain behaviour.

use crate::directory::domain::UserId;
use crate::task::domain::{
    NewTaskInstance, ProblemSeverity, Rating, StatusChange, TaskDomainError, TaskInstance,
    TaskStatus,
};
use crate::template::domain::TemplateId;
use chrono::{TimeZone, Utc};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn pending_task(clock: &DefaultClock) -> TaskInstance {
    TaskInstance::create(
        NewTaskInstance {
            template_id: TemplateId::new(),
            created_by: UserId::new(),
            assigned_to: UserId::new(),
            scheduled_for: Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
            title: Some("Morning medication".to_owned()),
            description: None,
        },
        clock,
    )
}

#[rstest]
fn create_starts_pending_with_clean_report_fields(clock: DefaultClock) -> eyre::Result<()> {
    let task = pending_task(&clock);

    ensure!(task.status() == TaskStatus::Pending);
    ensure!(task.created_at() == task.updated_at());
    ensure!(task.problem_message().is_none());
    ensure!(task.problem_severity().is_none());
    ensure!(task.resolution_note().is_none());
    ensure!(task.rating().is_none());
    ensure!(task.review_note().is_none());
    ensure!(task.title() == Some("Morning medication"));
    Ok(())
}

#[rstest]
fn problem_fields_survive_return_to_in_progress(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    task.apply_status(
        StatusChange::to(TaskStatus::Problem)
            .with_problem_message("medication missing")
            .with_problem_severity(ProblemSeverity::Critical),
        &clock,
    )?;

    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;

    ensure!(task.status() == TaskStatus::InProgress);
    ensure!(task.problem_message() == Some("medication missing"));
    ensure!(task.problem_severity() == Some(ProblemSeverity::Critical));
    Ok(())
}

#[rstest]
fn new_problem_report_replaces_previous_fields(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    task.apply_status(
        StatusChange::to(TaskStatus::Problem)
            .with_problem_message("medication missing")
            .with_problem_severity(ProblemSeverity::Critical),
        &clock,
    )?;
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;

    // The second report carries no severity; the stored severity follows
    // the report rather than keeping the earlier value.
    task.apply_status(
        StatusChange::to(TaskStatus::Problem).with_problem_message("patient asleep"),
        &clock,
    )?;

    ensure!(task.problem_message() == Some("patient asleep"));
    ensure!(task.problem_severity().is_none());
    Ok(())
}

#[rstest]
fn whitespace_problem_message_is_rejected(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    let task_id = task.id();

    let result = task.apply_status(
        StatusChange::to(TaskStatus::Problem).with_problem_message("   "),
        &clock,
    );

    if result != Err(TaskDomainError::MissingProblemMessage(task_id)) {
        bail!("expected MissingProblemMessage, got {result:?}");
    }
    ensure!(task.status() == TaskStatus::InProgress);
    ensure!(task.problem_message().is_none());
    Ok(())
}

#[rstest]
fn resolution_note_is_recorded_when_supplied(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    task.apply_status(
        StatusChange::to(TaskStatus::Problem).with_problem_message("door locked"),
        &clock,
    )?;

    task.apply_status(
        StatusChange::to(TaskStatus::InProgress).with_resolution_note("spare key found"),
        &clock,
    )?;

    ensure!(task.resolution_note() == Some("spare key found"));
    Ok(())
}

#[rstest]
fn rating_done_task_records_rating_and_note(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    task.apply_status(StatusChange::to(TaskStatus::Done), &clock)?;
    let updated_at_before = task.updated_at();

    let rating = Rating::new(5)?;
    task.rate(rating, Some("spotless work".to_owned()))?;

    ensure!(task.rating() == Some(rating));
    ensure!(task.review_note() == Some("spotless work"));
    ensure!(task.updated_at() == updated_at_before);
    Ok(())
}

#[rstest]
#[case(TaskStatus::Pending)]
#[case(TaskStatus::InProgress)]
#[case(TaskStatus::Cancelled)]
fn rating_requires_done(#[case] status: TaskStatus, clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    match status {
        TaskStatus::Pending => {}
        TaskStatus::InProgress => {
            task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
        }
        _ => {
            task.apply_status(StatusChange::to(TaskStatus::Cancelled), &clock)?;
        }
    }
    let task_id = task.id();

    let result = task.rate(Rating::new(4)?, None);
    let expected = Err(TaskDomainError::RatingRequiresCompletion { task_id, status });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.rating().is_none());
    Ok(())
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(200)]
fn out_of_range_rating_is_rejected(#[case] value: u8) {
    assert_eq!(Rating::new(value), Err(TaskDomainError::InvalidRating(value)));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
fn in_range_rating_is_accepted(#[case] value: u8) -> eyre::Result<()> {
    ensure!(Rating::new(value)?.value() == value);
    Ok(())
}

#[rstest]
fn reschedule_moves_time_and_resets_status(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    task.apply_status(StatusChange::to(TaskStatus::InProgress), &clock)?;
    let new_time = Utc.with_ymd_and_hms(2025, 1, 11, 9, 0, 0).unwrap();

    task.reschedule(new_time, &clock)?;

    ensure!(task.scheduled_for() == new_time);
    ensure!(task.status() == TaskStatus::Pending);
    Ok(())
}

#[rstest]
fn reschedule_to_same_time_is_rejected(clock: DefaultClock) -> eyre::Result<()> {
    let mut task = pending_task(&clock);
    let current = task.scheduled_for();

    let result = task.reschedule(current, &clock);
    let expected = Err(TaskDomainError::UnchangedSchedule {
        task_id: task.id(),
        scheduled_for: current,
    });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.status() == TaskStatus::Pending);
    Ok(())
}

#[rstest]
fn unknown_status_string_fails_to_parse() {
    assert!(TaskStatus::try_from("paused").is_err());
}

#[rstest]
fn unknown_severity_string_fails_to_parse() {
    assert!(ProblemSeverity::try_from("catastrophic").is_err());
}

#[rstest]
fn status_round_trips_through_storage_form() -> eyre::Result<()> {
    ensure!(TaskStatus::try_from("in_progress") == Ok(TaskStatus::InProgress));
    ensure!(TaskStatus::InProgress.as_str() == "in_progress");
    Ok(())
}
