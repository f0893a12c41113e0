//! When steps for tracker workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use eyre::eyre;
use issue_sync::tracker::domain::LocalStatus;
use rstest_bdd_macros::when;

#[when(r#"the task status is set to "{status}""#)]
fn set_task_status(world: &mut WorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let target = LocalStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid status in scenario: {err}"))?;
    let workflow = world.workflow();
    let task = world
        .task
        .as_mut()
        .ok_or_else(|| eyre!("missing task in scenario world"))?;
    world.status_result = Some(run_async(workflow.update_status(task, target)));
    Ok(())
}

#[when("a worklog is submitted")]
fn submit_worklog(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let workflow = world.workflow();
    let task = world
        .task
        .as_mut()
        .ok_or_else(|| eyre!("missing task in scenario world"))?;
    world.worklog_result = Some(run_async(workflow.add_worklog(task)));
    Ok(())
}
