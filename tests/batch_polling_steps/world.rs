//! Shared world state for batch polling BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use issue_sync::tracker::{
    adapters::{
        ChannelTransport,
        memory::{InMemoryIssueTracker, InMemoryTaskRepository, RecordingNotifier, StaticConnectivity},
    },
    domain::{
        IssueFields, IssueKey, IssuePayload, RawTrackerSettings, TaskId, TaskSnapshot,
        TrackerConfig,
    },
    services::{BatchPoller, PollSummary, Precheck, RequestMultiplexer, SyncReconciler, TrackerClient},
};
use rstest::fixture;
use tokio::sync::mpsc;

/// Poller type used by the BDD world.
pub type TestPoller = BatchPoller<ChannelTransport, InMemoryTaskRepository>;

/// Scenario world for batch polling behaviour tests.
pub struct PollingWorld {
    pub tracker: InMemoryIssueTracker,
    pub repository: Arc<InMemoryTaskRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub roots: Vec<TaskId>,
    pub tasks: HashMap<String, TaskId>,
    pub summary: Option<PollSummary>,
}

impl PollingWorld {
    /// Creates a world with an empty tracker and repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracker: InMemoryIssueTracker::new(),
            repository: Arc::new(InMemoryTaskRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            roots: Vec::new(),
            tasks: HashMap::new(),
            summary: None,
        }
    }

    /// Wires a poller to the fake tracker. Must run inside the runtime.
    pub fn poller(&self) -> TestPoller {
        let raw = RawTrackerSettings {
            is_enabled: true,
            host: Some("tracker.example.com".to_owned()),
            user_name: Some("jdoe".to_owned()),
            password: Some("secret".to_owned()),
            ..RawTrackerSettings::default()
        };
        let config = TrackerConfig::from_raw(&raw);
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
        BatchPoller::new(reconciler, self.repository.clone())
    }
}

impl Default for PollingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PollingWorld {
    PollingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Fixed instant the scenarios count from.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(19_844)
}

/// Remote issue last updated at `updated`.
pub fn remote_issue(key: &IssueKey, updated: DateTime<Utc>) -> IssuePayload {
    IssuePayload {
        id: format!("id-{key}"),
        key: key.clone(),
        fields: IssueFields {
            summary: format!("Summary of {key}"),
            description: None,
            assignee: None,
            status: None,
            updated,
            timeestimate: None,
            timespent: None,
            attachment: None,
            comment: None,
        },
        changelog: None,
    }
}

/// Local task synced with `key` at the epoch.
pub fn synced_task(key: &IssueKey) -> TaskSnapshot {
    TaskSnapshot {
        original_key: Some(key.clone()),
        original_id: Some(format!("id-{key}")),
        original_updated: Some(epoch()),
        ..TaskSnapshot::new(format!("{key} Summary of {key}"))
    }
}
