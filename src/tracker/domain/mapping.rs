//! Transformation of remote issues into local task fields.

use super::{IssueComment, IssueKey, IssuePayload, RemoteStatus, TaskSnapshot};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Task fields derived from a remote issue.
///
/// Every field here is owned by the mapping: applying the record overwrites
/// present values and clears local values whose mapped value is `None`.
/// Task fields outside this record are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedIssue {
    /// `"<key> <summary>"`.
    pub title: String,
    /// Issue description.
    pub notes: Option<String>,
    /// Issue key.
    pub original_key: IssueKey,
    /// Remote identifier.
    pub original_id: String,
    /// Remote modification time.
    pub original_updated: DateTime<Utc>,
    /// Remote workflow status.
    pub original_status: Option<RemoteStatus>,
    /// Assignee identifier.
    pub original_assignee_key: Option<String>,
    /// Flattened comments.
    pub original_comments: Option<Vec<IssueComment>>,
    /// Attachment content URIs.
    pub original_attachments: Option<Vec<String>>,
    /// Browser link to the issue.
    pub original_link: String,
    /// Remaining estimate.
    pub original_estimate: Option<Duration>,
    /// Logged time.
    pub original_time_spent: Option<Duration>,
}

impl MappedIssue {
    /// Writes the mapped fields onto `task`.
    pub fn apply_to(self, task: &mut TaskSnapshot) {
        task.title = self.title;
        task.notes = self.notes;
        task.original_key = Some(self.original_key);
        task.original_id = Some(self.original_id);
        task.original_updated = Some(self.original_updated);
        task.original_status = self.original_status;
        task.original_assignee_key = self.original_assignee_key;
        task.original_comments = self.original_comments;
        task.original_attachments = self.original_attachments;
        task.original_link = Some(self.original_link);
        task.original_estimate = self.original_estimate;
        task.original_time_spent = self.original_time_spent;
    }

    /// Builds a fresh local task from the mapped fields.
    #[must_use]
    pub fn into_task(self) -> TaskSnapshot {
        let mut task = TaskSnapshot::default();
        self.apply_to(&mut task);
        task
    }
}

/// Stateless mapper from remote issues to [`MappedIssue`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueMapper {
    browse_base: String,
}

impl IssueMapper {
    /// Creates a mapper producing links against `host`.
    ///
    /// A bare host name is served over `https`.
    #[must_use]
    pub fn new(host: &str) -> Self {
        let trimmed = host.trim().trim_end_matches('/');
        let browse_base = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            format!("{trimmed}/browse/")
        } else {
            format!("https://{trimmed}/browse/")
        };
        Self { browse_base }
    }

    /// Maps a remote issue.
    #[must_use]
    pub fn map(&self, issue: &IssuePayload) -> MappedIssue {
        let fields = &issue.fields;
        MappedIssue {
            title: format!("{} {}", issue.key, fields.summary),
            notes: fields.description.clone(),
            original_key: issue.key.clone(),
            original_id: issue.id.clone(),
            original_updated: fields.updated,
            original_status: fields.status.clone(),
            original_assignee_key: fields
                .assignee
                .as_ref()
                .and_then(|assignee| assignee.identifier())
                .map(str::to_owned),
            original_comments: map_comments(issue),
            original_attachments: map_attachments(issue),
            original_link: format!("{}{}", self.browse_base, issue.key),
            original_estimate: fields.timeestimate.map(Duration::from_secs),
            original_time_spent: fields.timespent.map(Duration::from_secs),
        }
    }
}

fn map_comments(issue: &IssuePayload) -> Option<Vec<IssueComment>> {
    let page = issue.fields.comment.as_ref()?;
    let comments: Vec<IssueComment> = page
        .comments
        .iter()
        .map(|comment| IssueComment {
            author: comment
                .author
                .name
                .clone()
                .or_else(|| comment.author.display_name.clone())
                .unwrap_or_default(),
            body: comment.body.clone(),
        })
        .collect();
    (!comments.is_empty()).then_some(comments)
}

fn map_attachments(issue: &IssuePayload) -> Option<Vec<String>> {
    let attachments = issue.fields.attachment.as_ref()?;
    let uris: Vec<String> = attachments
        .iter()
        .map(|attachment| attachment.content.clone())
        .collect();
    (!uris.is_empty()).then_some(uris)
}
