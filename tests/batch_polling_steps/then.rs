//! Then steps for batch polling BDD scenarios.

use super::world::{PollingWorld, run_async};
use eyre::{WrapErr, eyre};
use issue_sync::tracker::{
    domain::ApiMethod,
    ports::{TaskRepository, ToastSeverity},
};
use rstest_bdd_macros::then;

#[then("{attempted:usize} tasks were attempted and {failed:usize} failed")]
fn attempted_and_failed(
    world: &PollingWorld,
    attempted: usize,
    failed: usize,
) -> Result<(), eyre::Report> {
    let summary = world.summary.ok_or_else(|| eyre!("poll has not run"))?;
    if summary.attempted != attempted || summary.failed != failed {
        return Err(eyre!(
            "expected {attempted} attempted and {failed} failed, got {summary:?}"
        ));
    }
    Ok(())
}

#[then(r#"the tracker was asked for "{keys}" in that order"#)]
fn tracker_asked_in_order(world: &PollingWorld, keys: String) -> Result<(), eyre::Report> {
    let asked: Vec<String> = world
        .tracker
        .calls_to(ApiMethod::FindIssue)
        .iter()
        .filter_map(|call| call.target().map(str::to_owned))
        .collect();
    let expected: Vec<&str> = keys.split(',').collect();
    if asked != expected {
        return Err(eyre!("expected lookups {expected:?}, got {asked:?}"));
    }
    Ok(())
}

#[then(r#"task "{key}" is flagged as updated with {count:usize} history entries"#)]
fn task_flagged_as_updated(
    world: &PollingWorld,
    key: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let id = world
        .tasks
        .get(&key)
        .copied()
        .ok_or_else(|| eyre!("unknown task {key}"))?;
    let task = run_async(world.repository.find_by_id(id))
        .wrap_err("load polled task")?
        .ok_or_else(|| eyre!("task {key} missing from repository"))?;

    if !task.is_updated {
        return Err(eyre!("task {key} was not flagged as updated"));
    }
    if task.original_changelog.len() != count {
        return Err(eyre!(
            "expected {count} history entries, got {}",
            task.original_changelog.len()
        ));
    }
    Ok(())
}

#[then(r#"an update toast is shown for "{key}""#)]
fn update_toast_shown(world: &PollingWorld, key: String) -> Result<(), eyre::Report> {
    let toasts = world.notifier.toasts_with(ToastSeverity::Update);
    if !toasts.iter().any(|message| message.contains(&key)) {
        return Err(eyre!("no update toast for {key}: {toasts:?}"));
    }
    Ok(())
}
