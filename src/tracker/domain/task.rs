//! Local task snapshot mirrored against a remote issue.

use super::{IssueKey, ParseLocalStatusError, RemoteStatus, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Local task status, used as the key of transition policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalStatus {
    /// Task is open and not started.
    Open,
    /// Task is being worked on.
    InProgress,
    /// Task has been completed.
    Done,
}

impl LocalStatus {
    /// Returns the canonical settings representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl TryFrom<&str> for LocalStatus {
    type Error = ParseLocalStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            _ => Err(ParseLocalStatusError(value.to_owned())),
        }
    }
}

/// Remote history entry merged into a task after a sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Display name of the author.
    pub author: String,
    /// Time the change was recorded remotely.
    pub created: DateTime<Utc>,
    /// Changed items, kept opaque.
    pub items: Vec<Value>,
}

/// Flattened remote comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment author login.
    pub author: String,
    /// Comment body.
    pub body: String,
}

/// Local task record as owned by the task repository.
///
/// The `original_*` fields mirror the remote issue as of the last sync. A task
/// without an `original_key` is purely local and never reconciled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskSnapshot {
    /// Local identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Local status.
    pub status: Option<LocalStatus>,
    /// Completion flag.
    pub is_done: bool,
    /// Set when a sync brought in remote changes the user has not seen.
    pub is_updated: bool,
    /// Parent task, resolved through the repository.
    pub parent_id: Option<TaskId>,
    /// Child tasks in display order, resolved through the repository.
    pub sub_tasks: Vec<TaskId>,
    /// Locally tracked time.
    pub time_spent: Option<Duration>,
    /// Local start time of the work.
    pub started: Option<DateTime<Utc>>,
    /// Remote issue key.
    pub original_key: Option<IssueKey>,
    /// Remote issue identifier.
    pub original_id: Option<String>,
    /// Remote modification time as of the last sync.
    pub original_updated: Option<DateTime<Utc>>,
    /// Remote workflow status.
    pub original_status: Option<RemoteStatus>,
    /// Remote assignee identifier.
    pub original_assignee_key: Option<String>,
    /// Remote history merged so far.
    pub original_changelog: Vec<ChangelogEntry>,
    /// Remote comments.
    pub original_comments: Option<Vec<IssueComment>>,
    /// Remote attachment URIs.
    pub original_attachments: Option<Vec<String>>,
    /// Browser link to the remote issue.
    pub original_link: Option<String>,
    /// Remote remaining estimate.
    pub original_estimate: Option<Duration>,
    /// Remote logged time.
    pub original_time_spent: Option<Duration>,
}

impl TaskSnapshot {
    /// Creates an untracked local task.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns the issue key when the task is bound to a remote issue.
    #[must_use]
    pub const fn tracked_key(&self) -> Option<&IssueKey> {
        self.original_key.as_ref()
    }

    /// Returns whether the task is bound to a remote issue.
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        self.original_key.is_some()
    }

    /// Returns whether the task owns child tasks.
    #[must_use]
    pub fn has_sub_tasks(&self) -> bool {
        !self.sub_tasks.is_empty()
    }

    /// Marks the task as synced at `now`, so the next reconciliation does not
    /// mistake a local mutation for a remote change.
    pub fn mark_synced_at(&mut self, now: DateTime<Utc>) {
        self.original_updated = Some(match self.original_updated {
            Some(previous) if previous > now => previous,
            _ => now,
        });
    }
}
