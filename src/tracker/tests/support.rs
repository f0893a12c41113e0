//! Shared harness wiring the services to the in-memory adapters.

use crate::tracker::{
    adapters::{
        ChannelTransport,
        memory::{
            FixedClock, InMemoryIssueTracker, InMemoryTaskRepository, RecordingNotifier,
            ScriptedDialogs, StaticConnectivity,
        },
    },
    domain::{
        IssueFields, IssueKey, IssuePayload, RawTrackerSettings, TaskSnapshot, TrackerConfig,
        TrackerUser,
    },
    ports::TrackerDialogs,
    services::{
        BatchPoller, IssueImportService, Precheck, RequestMultiplexer, SyncReconciler,
        TrackerClient, WorkflowOrchestrator,
    },
};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(super) const HOST: &str = "tracker.example.com";
pub(super) const USER: &str = "jdoe";

/// Instant `offset_secs` seconds after the fixed test epoch.
pub(super) fn at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
        + TimeDelta::seconds(offset_secs)
}

pub(super) fn raw_settings() -> RawTrackerSettings {
    RawTrackerSettings {
        is_enabled: true,
        host: Some(HOST.to_owned()),
        user_name: Some(USER.to_owned()),
        password: Some("secret".to_owned()),
        is_worklog_enabled: true,
        ..RawTrackerSettings::default()
    }
}

pub(super) fn issue(key: &str, id: &str, updated: DateTime<Utc>) -> IssuePayload {
    IssuePayload {
        id: id.to_owned(),
        key: IssueKey::new(key).expect("valid key"),
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

pub(super) fn assigned_to(mut payload: IssuePayload, user: &str) -> IssuePayload {
    payload.fields.assignee = Some(TrackerUser {
        key: Some(user.to_owned()),
        name: Some(user.to_owned()),
        display_name: None,
    });
    payload
}

pub(super) fn tracked_task(key: &str, id: &str, synced: DateTime<Utc>) -> TaskSnapshot {
    TaskSnapshot {
        original_key: Some(IssueKey::new(key).expect("valid key")),
        original_id: Some(id.to_owned()),
        original_updated: Some(synced),
        ..TaskSnapshot::new(format!("{key} Summary of {key}"))
    }
}

/// Services and adapters of one test, connected through the fake tracker.
pub(super) struct Stack {
    pub(super) tracker: InMemoryIssueTracker,
    pub(super) repository: Arc<InMemoryTaskRepository>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) connectivity: Arc<StaticConnectivity>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) dialogs: Arc<ScriptedDialogs>,
    pub(super) reconciler: Arc<SyncReconciler<ChannelTransport>>,
    _serve: JoinHandle<()>,
    _inbound: JoinHandle<()>,
}

impl Stack {
    /// Builds the stack. Must run inside a tokio runtime.
    pub(super) fn new(raw: &RawTrackerSettings) -> Self {
        let config = TrackerConfig::from_raw(raw);
        let timeout = config
            .settings()
            .map_or(crate::tracker::domain::DEFAULT_REQUEST_TIMEOUT, |settings| {
                settings.request_timeout()
            });

        let tracker = InMemoryIssueTracker::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let connectivity = Arc::new(StaticConnectivity::new(true));
        let (transport, outbound) = ChannelTransport::pair();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let serve = tracker.serve(outbound, inbound_tx);

        let multiplexer = Arc::new(RequestMultiplexer::new(
            Arc::new(transport),
            notifier.clone(),
            timeout,
        ));
        let inbound = multiplexer.attach_inbound(inbound_rx);
        let precheck = Precheck::new(config, connectivity.clone(), notifier.clone());
        let reconciler = Arc::new(SyncReconciler::new(
            TrackerClient::new(multiplexer),
            precheck,
        ));

        Self {
            tracker,
            repository: Arc::new(InMemoryTaskRepository::new()),
            notifier,
            connectivity,
            clock: Arc::new(FixedClock::new(at(3_600))),
            dialogs: Arc::new(ScriptedDialogs::new()),
            reconciler,
            _serve: serve,
            _inbound: inbound,
        }
    }

    pub(super) fn workflow(
        &self,
    ) -> WorkflowOrchestrator<ChannelTransport, InMemoryTaskRepository, ScriptedDialogs, FixedClock>
    {
        self.workflow_with(self.dialogs.clone())
    }

    pub(super) fn workflow_with<D>(
        &self,
        dialogs: Arc<D>,
    ) -> WorkflowOrchestrator<ChannelTransport, InMemoryTaskRepository, D, FixedClock>
    where
        D: TrackerDialogs,
    {
        WorkflowOrchestrator::new(
            self.reconciler.clone(),
            self.repository.clone(),
            dialogs,
            self.clock.clone(),
        )
    }

    pub(super) fn poller(&self) -> BatchPoller<ChannelTransport, InMemoryTaskRepository> {
        BatchPoller::new(self.reconciler.clone(), self.repository.clone())
    }

    pub(super) fn importer(&self) -> IssueImportService<ChannelTransport, InMemoryTaskRepository> {
        IssueImportService::new(self.reconciler.clone(), self.repository.clone())
    }

    pub(super) fn store(&self, task: TaskSnapshot) -> TaskSnapshot {
        self.repository
            .insert(task.clone())
            .expect("task should be stored");
        task
    }
}
