//! Given steps for tracker workflow BDD scenarios.

use super::world::{WorkflowWorld, epoch};
use chrono::TimeDelta;
use eyre::{WrapErr, eyre};
use issue_sync::tracker::domain::{
    IssueFields, IssueKey, IssuePayload, RemoteStatus, TaskSnapshot, TransitionDescriptor,
};
use rstest_bdd_macros::given;
use std::time::Duration;

#[given(r#"a tracked task "{key}""#)]
fn tracked_task(world: &mut WorkflowWorld, key: String) -> Result<(), eyre::Report> {
    let issue_key = IssueKey::new(key).wrap_err("parse issue key")?;
    world.tracker.put_issue(IssuePayload {
        id: "100".to_owned(),
        key: issue_key.clone(),
        fields: IssueFields {
            summary: "Remote summary".to_owned(),
            description: None,
            assignee: None,
            status: None,
            updated: epoch(),
            timeestimate: None,
            timespent: None,
            attachment: None,
            comment: None,
        },
        changelog: None,
    });
    world.task = Some(TaskSnapshot {
        original_key: Some(issue_key),
        original_id: Some("100".to_owned()),
        original_updated: Some(epoch()),
        ..TaskSnapshot::new("SYNC-1 Remote summary")
    });
    Ok(())
}

#[given(r#"status "{status}" is configured as "{policy}""#)]
fn status_policy(world: &mut WorkflowWorld, status: String, policy: String) {
    if policy.chars().all(|c| c.is_ascii_digit()) {
        world.settings.all_transitions.push(TransitionDescriptor {
            id: policy.clone(),
            name: Some("Start Progress".to_owned()),
            to: Some(RemoteStatus {
                id: None,
                name: "In Progress".to_owned(),
            }),
        });
    }
    world.settings.transitions.insert(status, policy);
}

#[given("automatic worklogs are enabled")]
fn automatic_worklogs(world: &mut WorkflowWorld) {
    world.settings.is_auto_worklog = true;
}

#[given("worklogs are logged against parent tasks")]
fn parent_worklogs(world: &mut WorkflowWorld) {
    world.settings.is_add_worklog_on_sub_task_done = true;
}

#[given("the task has {minutes:u64} minutes logged")]
fn task_has_time(world: &mut WorkflowWorld, minutes: u64) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_mut()
        .ok_or_else(|| eyre!("missing task in scenario world"))?;
    task.started = Some(epoch() + TimeDelta::minutes(5));
    task.time_spent = Some(Duration::from_secs(minutes * 60));
    Ok(())
}

#[given("the task has a sub-task")]
fn task_has_sub_task(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_mut()
        .ok_or_else(|| eyre!("missing task in scenario world"))?;
    let child = TaskSnapshot {
        parent_id: Some(task.id),
        ..TaskSnapshot::new("Sub-task")
    };
    task.sub_tasks.push(child.id);
    world
        .repository
        .insert(child)
        .wrap_err("store sub-task")?;
    Ok(())
}
