//! Then steps for tracker workflow BDD scenarios.

use super::world::WorkflowWorld;
use eyre::eyre;
use issue_sync::tracker::{
    domain::{ApiMethod, LocalStatus},
    ports::ToastSeverity,
    services::{SyncError, WorklogOutcome},
};
use rstest_bdd_macros::then;
use serde_json::Value;

#[then("the status update is rejected by policy")]
fn rejected_by_policy(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .status_result
        .as_ref()
        .ok_or_else(|| eyre!("missing status update result"))?;
    if !matches!(result, Err(SyncError::PolicyRejection { .. })) {
        return Err(eyre!("expected a policy rejection, got {result:?}"));
    }
    Ok(())
}

#[then("no tracker request was made")]
fn no_tracker_request(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let calls = world.tracker.calls();
    if !calls.is_empty() {
        return Err(eyre!("expected no tracker requests, got {calls:?}"));
    }
    Ok(())
}

#[then(r#"the tracker received "{methods}""#)]
fn tracker_received(world: &WorkflowWorld, methods: String) -> Result<(), eyre::Report> {
    let received: Vec<&'static str> = world
        .tracker
        .calls()
        .iter()
        .map(|call| call.api_method.as_str())
        .collect();
    let expected: Vec<&str> = methods.split(',').collect();
    if received != expected {
        return Err(eyre!("expected calls {expected:?}, got {received:?}"));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &WorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = LocalStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid status in scenario: {err}"))?;
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre!("missing task in scenario world"))?;
    if task.status != Some(expected) {
        return Err(eyre!("expected status {expected:?}, got {:?}", task.status));
    }
    Ok(())
}

#[then("the tracker received a worklog of {seconds:u64} seconds")]
fn tracker_received_worklog(world: &WorkflowWorld, seconds: u64) -> Result<(), eyre::Report> {
    let worklogs = world.tracker.calls_to(ApiMethod::AddWorklog);
    let logged = worklogs
        .first()
        .and_then(|call| call.arguments.get(1))
        .and_then(|body| body.get("timeSpentSeconds"))
        .and_then(Value::as_u64);
    if logged != Some(seconds) {
        return Err(eyre!("expected a worklog of {seconds}s, got {logged:?}"));
    }
    Ok(())
}

#[then(r#"a success toast reads "{message}""#)]
fn success_toast_reads(world: &WorkflowWorld, message: String) -> Result<(), eyre::Report> {
    let toasts = world.notifier.toasts_with(ToastSeverity::Success);
    if !toasts.contains(&message) {
        return Err(eyre!("expected success toast {message:?}, got {toasts:?}"));
    }
    Ok(())
}

#[then("the worklog is deferred to sub-tasks")]
fn worklog_deferred(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    match world.worklog_result {
        Some(Ok(WorklogOutcome::DeferredToSubTasks)) => Ok(()),
        ref other => Err(eyre!("expected a deferred worklog, got {other:?}")),
    }
}
