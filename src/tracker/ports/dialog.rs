//! Dialog port for decisions deferred to the user.

use crate::tracker::domain::{IssueKey, LocalStatus, TransitionDescriptor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Request to pick a transition for a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPrompt {
    /// Issue being transitioned.
    pub issue_key: IssueKey,
    /// Task title shown to the user.
    pub task_title: String,
    /// Local status the task is moving to.
    pub target: LocalStatus,
    /// Transitions the tracker currently offers.
    pub transitions: Vec<TransitionDescriptor>,
}

/// Worklog values presented to, and returned by, the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogDraft {
    /// Issue the work is logged against.
    pub issue_key: IssueKey,
    /// Title shown to the user.
    pub title: String,
    /// Start of the work.
    pub started: Option<DateTime<Utc>>,
    /// Time to log.
    pub time_spent: Option<Duration>,
    /// Worklog comment.
    pub comment: Option<String>,
}

/// Errors returned by dialog adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DialogError {
    /// The user dismissed the dialog.
    #[error("dialog cancelled by the user")]
    Cancelled,

    /// The dialog could not be shown.
    #[error("dialog failed: {0}")]
    Unavailable(String),
}

/// Presentation-layer dialogs the workflows may block on.
#[async_trait]
pub trait TrackerDialogs: Send + Sync {
    /// Asks the user which transition to apply.
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::Cancelled`] when the user dismisses the dialog.
    async fn choose_transition(
        &self,
        prompt: TransitionPrompt,
    ) -> Result<TransitionDescriptor, DialogError>;

    /// Lets the user confirm or edit a worklog before submission.
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::Cancelled`] when the user dismisses the dialog.
    async fn edit_worklog(&self, draft: WorklogDraft) -> Result<WorklogDraft, DialogError>;
}
