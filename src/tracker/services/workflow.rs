//! Status-transition and worklog workflows.
//!
//! Every workflow reconciles the task with the tracker before mutating
//! either side, and marks the task as synced after a successful mutation so
//! the next reconciliation does not report the change back as remote.

use super::{NotifyMode, PreconditionError, SyncError, SyncReconciler, SyncResult};
use crate::tracker::{
    domain::{
        ConfigurationError, IssueKey, LocalStatus, TaskId, TaskSnapshot, TrackerSettings,
        TransitionDescriptor, TransitionPolicy, WorklogEntry,
    },
    ports::{
        TaskRepository, ToastSeverity, TrackerDialogs, TrackerTransport, TransitionPrompt,
        WorklogDraft,
    },
};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Result of a status update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The task already had the requested status.
    AlreadyInStatus,
    /// The remote issue was transitioned.
    Transitioned(TransitionDescriptor),
}

/// Result of a worklog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorklogOutcome {
    /// A worklog was submitted.
    Submitted {
        /// Issue the work was logged against.
        issue_key: IssueKey,
        /// Logged duration.
        time_spent: Duration,
    },
    /// Nothing was logged because the task's sub-tasks log against it.
    DeferredToSubTasks,
}

/// Orchestrates workflows that mutate the remote issue.
pub struct WorkflowOrchestrator<T, R, D, C>
where
    T: TrackerTransport,
    R: TaskRepository,
    D: TrackerDialogs,
    C: Clock + Send + Sync,
{
    reconciler: Arc<SyncReconciler<T>>,
    repository: Arc<R>,
    dialogs: Arc<D>,
    clock: Arc<C>,
}

impl<T, R, D, C> WorkflowOrchestrator<T, R, D, C>
where
    T: TrackerTransport,
    R: TaskRepository,
    D: TrackerDialogs,
    C: Clock + Send + Sync,
{
    /// Creates a workflow orchestrator.
    #[must_use]
    pub const fn new(
        reconciler: Arc<SyncReconciler<T>>,
        repository: Arc<R>,
        dialogs: Arc<D>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            reconciler,
            repository,
            dialogs,
            clock,
        }
    }

    /// Lists the transitions the tracker currently offers for `task`.
    ///
    /// # Errors
    ///
    /// Returns precondition and request failures.
    pub async fn list_transitions(
        &self,
        task: &TaskSnapshot,
    ) -> SyncResult<Vec<TransitionDescriptor>> {
        let (settings, key) = self.reconciler.precheck().task(task)?;
        self.reconciler
            .client()
            .list_transitions(settings.connection(), &key)
            .await
    }

    /// Moves the remote issue along with a local status change.
    ///
    /// A stored policy for `target` is applied directly; without one, or when
    /// the policy is to always ask, the user picks from the transitions the
    /// tracker offers.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PolicyRejection`] when the policy says not to
    /// sync, [`SyncError::Dialog`] when the user cancels, and precondition,
    /// reconciliation and request failures.
    pub async fn update_status(
        &self,
        task: &mut TaskSnapshot,
        target: LocalStatus,
    ) -> SyncResult<StatusUpdate> {
        let (settings, key) = self.reconciler.precheck().task(task)?;

        let transition = match settings.transition_policy(target) {
            Some(TransitionPolicy::DoNot) => {
                return Err(SyncError::PolicyRejection { status: target });
            }
            Some(TransitionPolicy::Transition(stored)) => {
                if task.status == Some(target) {
                    return Ok(StatusUpdate::AlreadyInStatus);
                }
                stored.clone()
            }
            Some(TransitionPolicy::AlwaysAsk) | None => {
                let transitions = self
                    .reconciler
                    .client()
                    .list_transitions(settings.connection(), &key)
                    .await?;
                self.dialogs
                    .choose_transition(TransitionPrompt {
                        issue_key: key.clone(),
                        task_title: task.title.clone(),
                        target,
                        transitions,
                    })
                    .await?
            }
        };

        let applied = self
            .perform_transition(settings, task, transition, target)
            .await?;
        Ok(StatusUpdate::Transitioned(applied))
    }

    async fn perform_transition(
        &self,
        settings: &TrackerSettings,
        task: &mut TaskSnapshot,
        transition: TransitionDescriptor,
        target: LocalStatus,
    ) -> SyncResult<TransitionDescriptor> {
        self.reconciler.reconcile(task, NotifyMode::Notify).await?;

        let issue_ref = match (&task.original_id, &task.original_key) {
            (Some(id), _) => id.clone(),
            (None, Some(key)) => key.to_string(),
            (None, None) => return Err(self.reconciler.precheck().not_tracked(task).into()),
        };
        self.reconciler
            .client()
            .transition_issue(settings.connection(), &issue_ref, &transition.id)
            .await?;

        let named = if transition.name.is_some() {
            transition
        } else {
            settings
                .catalog_transition(&transition.id)
                .cloned()
                .unwrap_or(transition)
        };
        task.status = Some(target);
        task.original_status = Some(named.resulting_status());
        task.mark_synced_at(self.clock.utc());

        let label = named.name.as_deref().unwrap_or(&named.id);
        info!(task_id = %task.id, transition = %named.id, "transitioned tracker issue");
        self.reconciler.notifier().toast(
            ToastSeverity::Success,
            &format!("Tracker: Updated task status to \"{label}\""),
        );
        Ok(named)
    }

    /// Logs the task's time against its remote issue.
    ///
    /// With parent logging enabled, a sub-task of a tracked parent logs
    /// against a copy of the parent titled `"<parent key>: <child title>"`,
    /// and a task that owns sub-tasks logs nothing. The parent copy is
    /// discarded afterwards; only a task logged against itself is marked as
    /// synced.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::WorklogDisabled`]
    /// when worklogs are off, [`PreconditionError::NotTracked`] when neither
    /// task nor parent is tracked, and dialog, reconciliation and request
    /// failures.
    pub async fn add_worklog(&self, task: &mut TaskSnapshot) -> SyncResult<WorklogOutcome> {
        let settings = self.reconciler.precheck().settings()?;
        let worklog = settings.worklog();
        if !worklog.enabled {
            return Err(ConfigurationError::WorklogDisabled.into());
        }

        if worklog.log_against_parent {
            if let Some(parent_id) = task.parent_id {
                if let Some(mut parent) = self.tracked_parent(parent_id).await? {
                    let comment = task.title.clone();
                    substitute_parent(&mut parent, task);
                    return self
                        .submit_worklog(settings, &mut parent, Some(comment))
                        .await;
                }
            } else if task.has_sub_tasks() {
                return Ok(WorklogOutcome::DeferredToSubTasks);
            }
        }

        self.submit_worklog(settings, task, None).await
    }

    async fn tracked_parent(&self, parent_id: TaskId) -> SyncResult<Option<TaskSnapshot>> {
        let parent = self.repository.find_by_id(parent_id).await?;
        Ok(parent.filter(TaskSnapshot::is_tracked))
    }

    async fn submit_worklog(
        &self,
        settings: &TrackerSettings,
        target: &mut TaskSnapshot,
        draft_comment: Option<String>,
    ) -> SyncResult<WorklogOutcome> {
        let Some(key) = target.tracked_key().cloned() else {
            return Err(self.reconciler.precheck().not_tracked(target).into());
        };
        self.reconciler.reconcile(target, NotifyMode::Notify).await?;

        let (draft_started, draft_time_spent, comment) = if settings.worklog().automatic {
            (target.started, target.time_spent, None)
        } else {
            let edited = self
                .dialogs
                .edit_worklog(WorklogDraft {
                    issue_key: key.clone(),
                    title: target.title.clone(),
                    started: target.started,
                    time_spent: target.time_spent,
                    comment: draft_comment,
                })
                .await?;
            (edited.started, edited.time_spent, edited.comment)
        };

        let entry = match (draft_started, draft_time_spent) {
            (Some(started), Some(time_spent)) if !time_spent.is_zero() => WorklogEntry {
                started,
                time_spent,
                comment,
            },
            _ => {
                self.reconciler.notifier().toast(
                    ToastSeverity::Error,
                    "Tracker: Not enough parameters for worklog.",
                );
                return Err(PreconditionError::IncompleteWorklog(target.id).into());
            }
        };

        self.reconciler
            .client()
            .add_worklog(settings.connection(), &key, &entry)
            .await?;
        target.mark_synced_at(self.clock.utc());

        let minutes = entry.time_spent.as_secs().div_euclid(60);
        info!(task_id = %target.id, issue = %key, seconds = entry.time_spent.as_secs(), "submitted worklog");
        self.reconciler.notifier().toast(
            ToastSeverity::Success,
            &format!("Tracker: Updated worklog for {key} by {minutes}m."),
        );
        Ok(WorklogOutcome::Submitted {
            issue_key: key,
            time_spent: entry.time_spent,
        })
    }

    /// Assigns the remote issue to `assignee` and mirrors it locally.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::MissingAssignee`] for a blank assignee,
    /// and precondition and request failures.
    pub async fn update_assignee(&self, task: &mut TaskSnapshot, requested: &str) -> SyncResult<()> {
        let (settings, key) = self.reconciler.precheck().task(task)?;
        let assignee = requested.trim();
        if assignee.is_empty() {
            self.reconciler.notifier().toast(
                ToastSeverity::Error,
                "Tracker: Not enough parameters for updateAssignee.",
            );
            return Err(PreconditionError::MissingAssignee.into());
        }

        self.reconciler
            .client()
            .update_issue(
                settings.connection(),
                &key,
                json!({"assignee": {"name": assignee}}),
            )
            .await?;
        task.original_assignee_key = Some(assignee.to_owned());
        task.mark_synced_at(self.clock.utc());

        info!(task_id = %task.id, issue = %key, assignee, "updated tracker assignee");
        self.reconciler.notifier().toast(
            ToastSeverity::Success,
            &format!("Tracker: Assignee set to \"{assignee}\" for {key}"),
        );
        Ok(())
    }

    /// Assigns the remote issue to the configured user.
    ///
    /// Uses the internal name when one is configured and enabled.
    ///
    /// # Errors
    ///
    /// Returns the failures of [`Self::update_assignee`].
    pub async fn assign_to_self(&self, task: &mut TaskSnapshot) -> SyncResult<()> {
        let assignee = self
            .reconciler
            .precheck()
            .config()
            .require()?
            .self_assignee()
            .to_owned();
        self.update_assignee(task, &assignee).await
    }

    /// Pushes the task notes to the remote issue description.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DescriptionSyncDisabled`] when description sync is off, [`PreconditionError::MissingNotes`] when
    /// the task has no notes, and precondition and request failures.
    pub async fn update_description(&self, task: &mut TaskSnapshot) -> SyncResult<()> {
        let (settings, key) = self.reconciler.precheck().task(task)?;
        if !settings.update_description_from_local() {
            return Err(ConfigurationError::DescriptionSyncDisabled.into());
        }
        let Some(notes) = task.notes.clone() else {
            self.reconciler.notifier().toast(
                ToastSeverity::Error,
                "Tracker: Not enough parameters for updateIssueDescription.",
            );
            return Err(PreconditionError::MissingNotes(task.id).into());
        };

        self.reconciler
            .client()
            .update_issue(settings.connection(), &key, json!({"description": notes}))
            .await?;
        task.mark_synced_at(self.clock.utc());

        info!(task_id = %task.id, issue = %key, "updated tracker description");
        self.reconciler.notifier().toast(
            ToastSeverity::Success,
            &format!("Tracker: Description updated for {key}"),
        );
        Ok(())
    }
}

/// Turns a parent copy into the worklog target for `child`.
fn substitute_parent(parent: &mut TaskSnapshot, child: &TaskSnapshot) {
    let parent_key = parent
        .tracked_key()
        .map(ToString::to_string)
        .unwrap_or_default();
    parent.title = format!("{parent_key}: {}", child.title);
    parent.time_spent = child.time_spent;
    parent.started = child.started;
}
