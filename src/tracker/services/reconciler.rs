//! Reconciliation of local task snapshots with remote issues.

use super::{Precheck, SyncResult, TrackerClient};
use crate::tracker::{
    domain::{ChangelogEntry, IssueMapper, IssuePayload, TaskSnapshot},
    ports::{Notifier, TrackerTransport},
};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

/// Grace added to the last sync time before remote changes count as new.
const SKEW_TOLERANCE_SECS: i64 = 1;

/// Whether a reconciliation should surface changes to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    /// Merge history entries and flag the task as updated.
    Notify,
    /// Only refresh the mirrored fields.
    Silent,
}

/// Result of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The remote issue did not change since the last sync.
    Unchanged,
    /// The task was refreshed from the remote issue.
    Updated,
}

impl ReconcileOutcome {
    /// Returns whether the task was refreshed.
    #[must_use]
    pub const fn is_updated(self) -> bool {
        matches!(self, Self::Updated)
    }
}

fn change_threshold(task: &TaskSnapshot) -> Option<DateTime<Utc>> {
    task.original_updated
        .map(|last_sync| last_sync + TimeDelta::seconds(SKEW_TOLERANCE_SECS))
}

/// Merges a freshly fetched issue into `task`.
///
/// The issue counts as changed when its `updated` time is strictly after the
/// last sync plus one second. A task without a last sync time is left
/// untouched. History entries are merged only for changed issues in
/// [`NotifyMode::Notify`], and only when created strictly after the same
/// threshold.
pub fn merge_remote_issue(
    task: &mut TaskSnapshot,
    issue: &IssuePayload,
    mapper: &IssueMapper,
    mode: NotifyMode,
) -> ReconcileOutcome {
    let Some(limit) = change_threshold(task) else {
        return ReconcileOutcome::Unchanged;
    };
    if issue.fields.updated <= limit {
        return ReconcileOutcome::Unchanged;
    }

    if mode == NotifyMode::Notify {
        if let Some(changelog) = issue.changelog.as_ref() {
            let fresh = changelog
                .histories
                .iter()
                .filter(|history| history.created > limit)
                .map(|history| ChangelogEntry {
                    author: history
                        .author
                        .display_name
                        .clone()
                        .or_else(|| history.author.name.clone())
                        .unwrap_or_default(),
                    created: history.created,
                    items: history.items.clone(),
                });
            task.original_changelog.extend(fresh);
        }
        task.is_updated = true;
    }

    mapper.map(issue).apply_to(task);
    ReconcileOutcome::Updated
}

/// Brings tracked tasks up to date with the remote tracker.
pub struct SyncReconciler<T>
where
    T: TrackerTransport,
{
    client: TrackerClient<T>,
    precheck: Precheck,
}

impl<T> SyncReconciler<T>
where
    T: TrackerTransport,
{
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(client: TrackerClient<T>, precheck: Precheck) -> Self {
        Self { client, precheck }
    }

    /// Returns the tracker client.
    #[must_use]
    pub const fn client(&self) -> &TrackerClient<T> {
        &self.client
    }

    /// Returns the precondition gate.
    #[must_use]
    pub const fn precheck(&self) -> &Precheck {
        &self.precheck
    }

    /// Returns the notifier shared by the services.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.precheck.notifier()
    }

    /// Fetches the remote issue for `task` and merges it when it changed.
    ///
    /// The task is untouched when the call fails.
    ///
    /// # Errors
    ///
    /// Returns precondition failures before any request is made, and request
    /// or payload failures from the fetch.
    pub async fn reconcile(
        &self,
        task: &mut TaskSnapshot,
        mode: NotifyMode,
    ) -> SyncResult<ReconcileOutcome> {
        let (settings, key) = self.precheck.task(task)?;
        let issue = self.client.find_issue(settings.connection(), &key).await?;
        let mapper = IssueMapper::new(&settings.connection().host);
        let outcome = merge_remote_issue(task, &issue, &mapper, mode);
        debug!(task_id = %task.id, issue = %key, ?outcome, "reconciled task");
        Ok(outcome)
    }
}
