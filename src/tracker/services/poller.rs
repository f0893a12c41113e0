//! Sequential polling of tracked tasks.

use super::{NotifyMode, SyncReconciler, SyncResult};
use crate::tracker::{
    domain::{TaskId, TaskSnapshot},
    ports::{Notification, TaskRepository, ToastSeverity, TrackerTransport},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counts reported by [`BatchPoller::poll_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Tracked tasks a reconciliation was started for.
    pub attempted: usize,
    /// Tasks that pulled in remote changes.
    pub updated: usize,
    /// Tasks whose reconciliation or write-back failed.
    pub failed: usize,
}

/// Reconciles many tasks one after another.
pub struct BatchPoller<T, R>
where
    T: TrackerTransport,
    R: TaskRepository,
{
    reconciler: Arc<SyncReconciler<T>>,
    repository: Arc<R>,
}

impl<T, R> BatchPoller<T, R>
where
    T: TrackerTransport,
    R: TaskRepository,
{
    /// Creates a poller.
    #[must_use]
    pub const fn new(reconciler: Arc<SyncReconciler<T>>, repository: Arc<R>) -> Self {
        Self {
            reconciler,
            repository,
        }
    }

    /// Polls every tracked task in the forest rooted at `roots`.
    ///
    /// A tracked task is polled without descending into its sub-tasks; an
    /// untracked task is skipped but its sub-tasks are searched. Tasks are
    /// reconciled strictly in order, each only after the previous one
    /// settled, and a failing task does not stop the rest.
    pub async fn poll_all(&self, roots: &[TaskId]) -> PollSummary {
        let tasks = self.flatten(roots).await;
        let mut summary = PollSummary::default();

        for mut task in tasks {
            summary.attempted += 1;
            match self.poll_one(&mut task).await {
                Ok(true) => summary.updated += 1,
                Ok(false) => {}
                Err(err) => {
                    summary.failed += 1;
                    warn!(task_id = %task.id, error = %err, "polling tracked task failed");
                }
            }
        }

        debug!(?summary, "finished polling tracked tasks");
        summary
    }

    async fn poll_one(&self, task: &mut TaskSnapshot) -> SyncResult<bool> {
        let outcome = self.reconciler.reconcile(task, NotifyMode::Notify).await?;
        if outcome.is_updated() {
            self.repository.save(task).await?;
        }
        self.report(task, outcome.is_updated());
        Ok(outcome.is_updated())
    }

    async fn flatten(&self, roots: &[TaskId]) -> Vec<TaskSnapshot> {
        let mut tracked = Vec::new();
        let mut stack: Vec<TaskId> = roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let task = match self.repository.find_by_id(id).await {
                Ok(Some(task)) => task,
                Ok(None) => {
                    debug!(task_id = %id, "skipping missing task while polling");
                    continue;
                }
                Err(err) => {
                    warn!(task_id = %id, error = %err, "task lookup failed while polling");
                    continue;
                }
            };
            if task.is_tracked() {
                tracked.push(task);
            } else {
                stack.extend(task.sub_tasks.iter().rev().copied());
            }
        }
        tracked
    }

    /// Reconciles `task`, or its tracked parent when `task` is untracked.
    ///
    /// Failures are logged and swallowed; the returned snapshot is the
    /// refreshed one on success and the unchanged one otherwise.
    pub async fn refresh_task_or_parent(
        &self,
        task: TaskSnapshot,
        mode: NotifyMode,
    ) -> TaskSnapshot {
        let mut target = match (task.is_tracked(), task.parent_id) {
            (false, Some(parent_id)) => match self.repository.find_by_id(parent_id).await {
                Ok(Some(parent)) if parent.is_tracked() => parent,
                Ok(_) => task,
                Err(err) => {
                    warn!(task_id = %task.id, error = %err, "parent lookup failed");
                    task
                }
            },
            _ => task,
        };
        if !target.is_tracked() {
            return target;
        }

        let snapshot = target.clone();
        match self.poll_one(&mut target).await {
            Ok(_) => target,
            Err(err) => {
                warn!(task_id = %target.id, error = %err, "refreshing tracked task failed");
                snapshot
            }
        }
    }

    fn report(&self, task: &TaskSnapshot, updated: bool) {
        let Some(key) = task.tracked_key() else {
            return;
        };
        let notifier = self.reconciler.notifier();

        let own_user = self
            .reconciler
            .precheck()
            .config()
            .settings()
            .map(|settings| settings.connection().user_name.as_str());
        let foreign_assignee = task
            .original_assignee_key
            .as_deref()
            .filter(|assignee| own_user != Some(*assignee) && !task.is_done);
        if let Some(assignee) = foreign_assignee {
            let message = format!("\"{key}\" is assigned to \"{assignee}\".");
            notifier.notify(Notification {
                title: format!("Tracker issue {key} is assigned to another user"),
                message: message.clone(),
                sound: true,
                wait: true,
            });
            notifier.toast(ToastSeverity::Warning, &message);
        }

        if updated {
            let message = format!("\"{key}\" => has been updated as it was updated on the tracker.");
            notifier.notify(Notification {
                title: "Tracker Update".to_owned(),
                message: message.clone(),
                sound: true,
                wait: true,
            });
            notifier.toast(ToastSeverity::Update, &message);
        }
    }
}
