//! Given steps for batch polling BDD scenarios.

use super::world::{PollingWorld, epoch, remote_issue, synced_task};
use chrono::TimeDelta;
use eyre::WrapErr;
use issue_sync::tracker::domain::{IssueChangelog, IssueHistory, IssueKey, TaskSnapshot, TrackerUser};
use rstest_bdd_macros::given;
use serde_json::json;

#[given(r#"tracked tasks "{keys}""#)]
fn tracked_tasks(world: &mut PollingWorld, keys: String) -> Result<(), eyre::Report> {
    for raw_key in keys.split(',') {
        let key = IssueKey::new(raw_key).wrap_err("parse issue key")?;
        world.tracker.put_issue(remote_issue(&key, epoch()));
        let task = synced_task(&key);
        world
            .repository
            .insert(task.clone())
            .wrap_err("store tracked task")?;
        world.roots.push(task.id);
        world.tasks.insert(key.to_string(), task.id);
    }
    Ok(())
}

#[given(r#"the tracker fails requests for "{key}""#)]
fn tracker_fails_requests(world: &mut PollingWorld, key: String) {
    world
        .tracker
        .fail_requests_for(&key, "500 Internal Server Error");
}

#[given(r#"issue "{key}" was changed remotely by "{author}""#)]
fn issue_changed_remotely(
    world: &mut PollingWorld,
    key: String,
    author: String,
) -> Result<(), eyre::Report> {
    let issue_key = IssueKey::new(key).wrap_err("parse issue key")?;
    let mut issue = remote_issue(&issue_key, epoch() + TimeDelta::seconds(60));
    issue.changelog = Some(IssueChangelog {
        histories: vec![IssueHistory {
            author: TrackerUser {
                key: Some(author.clone()),
                name: Some(author),
                display_name: None,
            },
            created: epoch() + TimeDelta::seconds(30),
            items: vec![json!({"field": "summary"})],
        }],
    });
    world.tracker.put_issue(issue);
    Ok(())
}

#[given("the tracked tasks are grouped under an untracked task")]
fn grouped_under_untracked(world: &mut PollingWorld) -> Result<(), eyre::Report> {
    let group = TaskSnapshot {
        sub_tasks: world.roots.clone(),
        ..TaskSnapshot::new("Grouping task")
    };
    world.roots = vec![group.id];
    world
        .repository
        .insert(group)
        .wrap_err("store grouping task")?;
    Ok(())
}
