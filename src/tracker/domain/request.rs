//! Messages exchanged with the out-of-process tracker transport.

use super::{ConnectionSettings, CorrelationId, IssueKey, format_tracker_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

/// Maximum number of issues requested per search.
pub const SEARCH_MAX_RESULTS: u32 = 100;

/// Issue fields requested by searches.
pub const SEARCH_FIELDS: [&str; 9] = [
    "assignee",
    "summary",
    "description",
    "timeestimate",
    "timespent",
    "status",
    "attachment",
    "comment",
    "updated",
];

/// Tracker API operations the transport understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiMethod {
    /// Fetch a single issue.
    FindIssue,
    /// List transitions available for an issue.
    ListTransitions,
    /// Apply a workflow transition.
    TransitionIssue,
    /// Submit a worklog.
    AddWorklog,
    /// Update issue fields.
    UpdateIssue,
    /// Run an issue search query.
    SearchJira,
    /// Search users.
    SearchUsers,
}

impl ApiMethod {
    /// Returns the wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindIssue => "findIssue",
            Self::ListTransitions => "listTransitions",
            Self::TransitionIssue => "transitionIssue",
            Self::AddWorklog => "addWorklog",
            Self::UpdateIssue => "updateIssue",
            Self::SearchJira => "searchJira",
            Self::SearchUsers => "searchUsers",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worklog submitted against an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogEntry {
    /// When the work started.
    pub started: DateTime<Utc>,
    /// Logged duration.
    pub time_spent: Duration,
    /// Optional worklog comment.
    pub comment: Option<String>,
}

/// Immutable description of one tracker call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    api_method: ApiMethod,
    arguments: Vec<Value>,
    config: ConnectionSettings,
}

impl RequestDescriptor {
    /// Creates a descriptor from raw arguments.
    #[must_use]
    pub const fn new(api_method: ApiMethod, arguments: Vec<Value>, config: ConnectionSettings) -> Self {
        Self {
            api_method,
            arguments,
            config,
        }
    }

    /// Fetches an issue together with its change history.
    #[must_use]
    pub fn find_issue(config: &ConnectionSettings, key: &IssueKey) -> Self {
        Self::new(
            ApiMethod::FindIssue,
            vec![json!(key.as_str()), json!("changelog")],
            config.clone(),
        )
    }

    /// Lists the transitions available for an issue.
    #[must_use]
    pub fn list_transitions(config: &ConnectionSettings, key: &IssueKey) -> Self {
        Self::new(
            ApiMethod::ListTransitions,
            vec![json!(key.as_str())],
            config.clone(),
        )
    }

    /// Applies a transition to the issue with the given remote id.
    #[must_use]
    pub fn transition_issue(config: &ConnectionSettings, issue_id: &str, transition_id: &str) -> Self {
        Self::new(
            ApiMethod::TransitionIssue,
            vec![
                json!(issue_id),
                json!({"transition": {"id": transition_id}}),
            ],
            config.clone(),
        )
    }

    /// Submits a worklog.
    #[must_use]
    pub fn add_worklog(config: &ConnectionSettings, key: &IssueKey, entry: &WorklogEntry) -> Self {
        Self::new(
            ApiMethod::AddWorklog,
            vec![
                json!(key.as_str()),
                json!({
                    "started": format_tracker_timestamp(entry.started),
                    "timeSpentSeconds": entry.time_spent.as_secs(),
                    "comment": entry.comment,
                }),
            ],
            config.clone(),
        )
    }

    /// Updates issue fields.
    #[must_use]
    pub fn update_issue(config: &ConnectionSettings, key: &IssueKey, fields: Value) -> Self {
        Self::new(
            ApiMethod::UpdateIssue,
            vec![json!(key.as_str()), json!({ "fields": fields })],
            config.clone(),
        )
    }

    /// Runs an issue search.
    #[must_use]
    pub fn search(config: &ConnectionSettings, query: &str) -> Self {
        Self::new(
            ApiMethod::SearchJira,
            vec![
                json!(query),
                json!({"maxResults": SEARCH_MAX_RESULTS, "fields": SEARCH_FIELDS}),
            ],
            config.clone(),
        )
    }

    /// Searches users by name.
    #[must_use]
    pub fn search_users(config: &ConnectionSettings, query: &str) -> Self {
        Self::new(
            ApiMethod::SearchUsers,
            vec![json!({ "username": query })],
            config.clone(),
        )
    }

    /// Returns the API method.
    #[must_use]
    pub const fn api_method(&self) -> ApiMethod {
        self.api_method
    }

    /// Returns the call arguments.
    #[must_use]
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Returns the connection snapshot.
    #[must_use]
    pub const fn config(&self) -> &ConnectionSettings {
        &self.config
    }

    /// Attaches a correlation id, producing the wire message.
    #[must_use]
    pub fn into_outbound(self, request_id: CorrelationId) -> OutboundRequest {
        OutboundRequest {
            request_id,
            config: self.config,
            api_method: self.api_method,
            arguments: self.arguments,
        }
    }
}

/// Message written to the transport channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRequest {
    /// Correlation id.
    pub request_id: CorrelationId,
    /// Connection snapshot.
    pub config: ConnectionSettings,
    /// API method.
    pub api_method: ApiMethod,
    /// Call arguments.
    pub arguments: Vec<Value>,
}

/// Message read from the transport channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Correlation id of the request being answered.
    pub request_id: CorrelationId,
    /// Success payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponseEnvelope {
    /// Builds a success envelope.
    #[must_use]
    pub const fn success(request_id: CorrelationId, response: Value) -> Self {
        Self {
            request_id,
            response: Some(response),
            error: None,
        }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn failure(request_id: CorrelationId, error: impl Into<String>) -> Self {
        Self {
            request_id,
            response: None,
            error: Some(Value::String(error.into())),
        }
    }

    /// Splits the envelope into its id and outcome.
    ///
    /// A non-null `error` wins over any payload.
    #[must_use]
    pub fn into_outcome(self) -> (CorrelationId, Result<Value, String>) {
        let outcome = match self.error {
            Some(Value::Null) | None => Ok(self.response.unwrap_or(Value::Null)),
            Some(Value::String(message)) => Err(message),
            Some(other) => Err(other.to_string()),
        };
        (self.request_id, outcome)
    }
}
