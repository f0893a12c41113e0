//! When steps for batch polling BDD scenarios.

use super::world::{PollingWorld, run_async};
use rstest_bdd_macros::when;

fn poll_roots(world: &mut PollingWorld) {
    let poller = world.poller();
    world.summary = Some(run_async(poller.poll_all(&world.roots)));
}

#[when("all tracked tasks are polled")]
fn all_tracked_tasks_polled(world: &mut PollingWorld) {
    poll_roots(world);
}

#[when("the untracked task is polled")]
fn untracked_task_polled(world: &mut PollingWorld) {
    poll_roots(world);
}
