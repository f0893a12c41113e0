//! Remote issue payloads as returned by the tracker transport.
//!
//! These types mirror the subset of the tracker's JSON that reconciliation
//! and mapping rely on. Unknown fields are ignored.

use super::{IssueKey, TrackerDomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timestamp layout used by the tracker (`2024-01-31T09:15:00.000+0100`).
pub const TRACKER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Parses a tracker timestamp, accepting RFC 3339 as well.
///
/// # Errors
///
/// Returns [`TrackerDomainError::InvalidTimestamp`] when neither layout
/// matches.
pub fn parse_tracker_timestamp(value: &str) -> Result<DateTime<Utc>, TrackerDomainError> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| TrackerDomainError::InvalidTimestamp(value.to_owned()))
}

/// Formats a timestamp in the tracker layout.
#[must_use]
pub fn format_tracker_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TRACKER_TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter for tracker timestamps.
pub mod tracker_timestamp {
    use super::{format_tracker_timestamp, parse_tracker_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Serialises a timestamp in the tracker layout.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_tracker_timestamp(*value))
    }

    /// Deserialises a timestamp in tracker or RFC 3339 layout.
    ///
    /// # Errors
    ///
    /// Returns a deserialisation error for unparseable timestamps.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_tracker_timestamp(&raw).map_err(D::Error::custom)
    }
}

/// Tracker user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUser {
    /// Stable user key, when the tracker exposes one.
    #[serde(default)]
    pub key: Option<String>,
    /// Login name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl TrackerUser {
    /// Returns the identifier used to compare assignees: the key, else the
    /// login name.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.key.as_deref().or(self.name.as_deref())
    }
}

/// Workflow status of a remote issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStatus {
    /// Status identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Status name.
    pub name: String,
}

/// Workflow transition offered by the tracker.
///
/// Stored transition policies only carry the identifier; the name is filled
/// in from the configured catalog after the transition succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescriptor {
    /// Transition identifier.
    pub id: String,
    /// Transition name.
    #[serde(default)]
    pub name: Option<String>,
    /// Status the issue lands in after the transition.
    #[serde(default)]
    pub to: Option<RemoteStatus>,
}

impl TransitionDescriptor {
    /// Creates a descriptor that only knows its identifier.
    #[must_use]
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            to: None,
        }
    }

    /// Returns the status a task mirrors after this transition.
    #[must_use]
    pub fn resulting_status(&self) -> RemoteStatus {
        self.to.clone().unwrap_or_else(|| RemoteStatus {
            id: None,
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
        })
    }
}

/// Attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAttachment {
    /// Content URI.
    pub content: String,
}

/// Single issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    /// Comment author.
    pub author: TrackerUser,
    /// Comment body.
    #[serde(default)]
    pub body: String,
}

/// Comment page attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComments {
    /// Comments in tracker order.
    #[serde(default)]
    pub comments: Vec<RemoteComment>,
}

/// Issue fields relevant to synchronisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFields {
    /// Issue summary.
    #[serde(default)]
    pub summary: String,
    /// Issue description.
    #[serde(default)]
    pub description: Option<String>,
    /// Current assignee.
    #[serde(default)]
    pub assignee: Option<TrackerUser>,
    /// Current workflow status.
    #[serde(default)]
    pub status: Option<RemoteStatus>,
    /// Last remote modification time.
    #[serde(with = "tracker_timestamp")]
    pub updated: DateTime<Utc>,
    /// Remaining estimate in seconds.
    #[serde(default)]
    pub timeestimate: Option<u64>,
    /// Logged time in seconds.
    #[serde(default)]
    pub timespent: Option<u64>,
    /// Attachments.
    #[serde(default)]
    pub attachment: Option<Vec<IssueAttachment>>,
    /// Comments.
    #[serde(default)]
    pub comment: Option<RemoteComments>,
}

/// Single change history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueHistory {
    /// User who made the change.
    pub author: TrackerUser,
    /// Time the change was recorded.
    #[serde(with = "tracker_timestamp")]
    pub created: DateTime<Utc>,
    /// Changed items, kept opaque.
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Change history attached to an issue when requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueChangelog {
    /// History entries in tracker order.
    #[serde(default)]
    pub histories: Vec<IssueHistory>,
}

/// Remote issue as fetched from the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuePayload {
    /// Remote numeric identifier.
    pub id: String,
    /// Issue key.
    pub key: IssueKey,
    /// Issue fields.
    pub fields: IssueFields,
    /// Change history, present when fetched with the changelog expansion.
    #[serde(default)]
    pub changelog: Option<IssueChangelog>,
}

/// Result page of an issue search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSearchResult {
    /// Matching issues.
    #[serde(default)]
    pub issues: Vec<IssuePayload>,
}

/// Result of listing the transitions available for an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionList {
    /// Available transitions.
    #[serde(default)]
    pub transitions: Vec<TransitionDescriptor>,
}
