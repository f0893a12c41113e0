//! Shared world state for tracker workflow BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use issue_sync::tracker::{
    adapters::{
        ChannelTransport,
        memory::{
            FixedClock, InMemoryIssueTracker, InMemoryTaskRepository, RecordingNotifier,
            ScriptedDialogs, StaticConnectivity,
        },
    },
    domain::{RawTrackerSettings, TaskSnapshot, TrackerConfig},
    services::{
        Precheck, RequestMultiplexer, StatusUpdate, SyncError, SyncReconciler, TrackerClient,
        WorkflowOrchestrator, WorklogOutcome,
    },
};
use rstest::fixture;
use tokio::sync::mpsc;

/// Orchestrator type used by the BDD world.
pub type TestWorkflow =
    WorkflowOrchestrator<ChannelTransport, InMemoryTaskRepository, ScriptedDialogs, FixedClock>;

/// Scenario world for tracker workflow behaviour tests.
pub struct WorkflowWorld {
    pub settings: RawTrackerSettings,
    pub tracker: InMemoryIssueTracker,
    pub repository: Arc<InMemoryTaskRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub clock: Arc<FixedClock>,
    pub task: Option<TaskSnapshot>,
    pub status_result: Option<Result<StatusUpdate, SyncError>>,
    pub worklog_result: Option<Result<WorklogOutcome, SyncError>>,
}

impl WorkflowWorld {
    /// Creates a world with an enabled, worklog-capable configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: RawTrackerSettings {
                is_enabled: true,
                host: Some("tracker.example.com".to_owned()),
                user_name: Some("jdoe".to_owned()),
                password: Some("secret".to_owned()),
                is_worklog_enabled: true,
                ..RawTrackerSettings::default()
            },
            tracker: InMemoryIssueTracker::new(),
            repository: Arc::new(InMemoryTaskRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            dialogs: Arc::new(ScriptedDialogs::new()),
            clock: Arc::new(FixedClock::new(epoch() + TimeDelta::hours(1))),
            task: None,
            status_result: None,
            worklog_result: None,
        }
    }

    /// Wires an orchestrator to the fake tracker using the current
    /// settings. Must run inside the runtime.
    pub fn workflow(&self) -> TestWorkflow {
        let config = TrackerConfig::from_raw(&self.settings);
        let (transport, outbound) = ChannelTransport::pair();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        drop(self.tracker.serve(outbound, inbound_tx));

        let multiplexer = Arc::new(RequestMultiplexer::new(
            Arc::new(transport),
            self.notifier.clone(),
            std::time::Duration::from_secs(5),
        ));
        drop(multiplexer.attach_inbound(inbound_rx));
        let precheck = Precheck::new(
            config,
            Arc::new(StaticConnectivity::new(true)),
            self.notifier.clone(),
        );
        let reconciler = Arc::new(SyncReconciler::new(TrackerClient::new(multiplexer), precheck));
        WorkflowOrchestrator::new(
            reconciler,
            self.repository.clone(),
            self.dialogs.clone(),
            self.clock.clone(),
        )
    }
}

impl Default for WorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkflowWorld {
    WorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Fixed instant the scenarios count from.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(19_844)
}
