//! Fake tracker answering transport requests from in-memory state.
//!
//! [`InMemoryIssueTracker::serve`] plays the part of the external process
//! behind the transport channel: it reads [`OutboundRequest`]s and writes the
//! matching [`ResponseEnvelope`]s back.

use crate::tracker::domain::{
    ApiMethod, IssuePayload, IssueSearchResult, OutboundRequest, ResponseEnvelope,
    TrackerUser, TransitionDescriptor, TransitionList,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Request as received by the fake tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Called API method.
    pub api_method: ApiMethod,
    /// Call arguments.
    pub arguments: Vec<Value>,
}

impl RecordedCall {
    /// Returns the issue key or id the call targets, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self.api_method {
            ApiMethod::SearchJira | ApiMethod::SearchUsers => None,
            _ => self.arguments.first().and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    issues: Vec<IssuePayload>,
    transitions: Vec<TransitionDescriptor>,
    users: Vec<TrackerUser>,
    search_results: Vec<IssuePayload>,
    failures: HashMap<String, String>,
    silenced: HashSet<String>,
    calls: Vec<RecordedCall>,
}

impl TrackerState {
    fn issue_mut(&mut self, target: &str) -> Option<&mut IssuePayload> {
        self.issues
            .iter_mut()
            .find(|issue| issue.key.as_str() == target || issue.id == target)
    }
}

/// In-memory stand-in for the remote tracker.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl InMemoryIssueTracker {
    /// Creates a tracker with no issues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an issue.
    pub fn put_issue(&self, issue: IssuePayload) {
        let mut state = self.lock();
        state.issues.retain(|stored| stored.key != issue.key);
        state.issues.push(issue);
    }

    /// Returns the current state of an issue by key or id.
    #[must_use]
    pub fn issue(&self, target: &str) -> Option<IssuePayload> {
        self.lock().issue_mut(target).cloned()
    }

    /// Sets the transitions offered for every issue.
    pub fn set_transitions(&self, transitions: Vec<TransitionDescriptor>) {
        self.lock().transitions = transitions;
    }

    /// Sets the users returned by user searches.
    pub fn set_users(&self, users: Vec<TrackerUser>) {
        self.lock().users = users;
    }

    /// Sets the issues returned by issue searches.
    pub fn set_search_results(&self, issues: Vec<IssuePayload>) {
        self.lock().search_results = issues;
    }

    /// Answers every request targeting `target` with an error.
    pub fn fail_requests_for(&self, target: &str, cause: &str) {
        self.lock()
            .failures
            .insert(target.to_owned(), cause.to_owned());
    }

    /// Never answers requests targeting `target`.
    pub fn silence_requests_for(&self, target: &str) {
        self.lock().silenced.insert(target.to_owned());
    }

    /// Returns every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Returns the calls made with `method`, in order.
    #[must_use]
    pub fn calls_to(&self, method: ApiMethod) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.api_method == method)
            .cloned()
            .collect()
    }

    /// Records `request` and computes its response.
    ///
    /// Returns `None` for silenced targets.
    #[must_use]
    pub fn respond(&self, request: &OutboundRequest) -> Option<ResponseEnvelope> {
        let call = RecordedCall {
            api_method: request.api_method,
            arguments: request.arguments.clone(),
        };
        let mut state = self.lock();
        state.calls.push(call.clone());

        let call_target = call.target().map(str::to_owned);
        if let Some(target) = call_target.as_deref() {
            if state.silenced.contains(target) {
                debug!(request_id = %request.request_id, target, "fake tracker withholding response");
                return None;
            }
            if let Some(cause) = state.failures.get(target) {
                return Some(ResponseEnvelope::failure(request.request_id, cause.clone()));
            }
        }

        let outcome = answer(&mut state, &call, call_target.as_deref());
        Some(match outcome {
            Ok(response) => ResponseEnvelope::success(request.request_id, response),
            Err(cause) => ResponseEnvelope::failure(request.request_id, cause),
        })
    }

    /// Spawns a task answering every request read from `outbound` on
    /// `inbound`.
    ///
    /// The task ends when either channel closes.
    #[must_use]
    pub fn serve(
        &self,
        mut outbound: mpsc::UnboundedReceiver<OutboundRequest>,
        inbound: mpsc::UnboundedSender<ResponseEnvelope>,
    ) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            while let Some(request) = outbound.recv().await {
                let Some(envelope) = tracker.respond(&request) else {
                    continue;
                };
                if inbound.send(envelope).is_err() {
                    break;
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn answer(state: &mut TrackerState, call: &RecordedCall, target: Option<&str>) -> Result<Value, String> {
    match call.api_method {
        ApiMethod::FindIssue => {
            let issue = target.and_then(|key| state.issue_mut(key)).ok_or_else(not_found)?;
            to_value(&*issue)
        }
        ApiMethod::ListTransitions => to_value(&TransitionList {
            transitions: state.transitions.clone(),
        }),
        ApiMethod::TransitionIssue => {
            let transition_id = call
                .arguments
                .get(1)
                .and_then(|body| body.pointer("/transition/id"))
                .and_then(Value::as_str)
                .ok_or("transition id missing")?;
            let resulting = state
                .transitions
                .iter()
                .find(|transition| transition.id == transition_id)
                .map(TransitionDescriptor::resulting_status);
            let issue = target.and_then(|key| state.issue_mut(key)).ok_or_else(not_found)?;
            issue.fields.status = resulting.or(issue.fields.status.take());
            Ok(json!({}))
        }
        ApiMethod::AddWorklog => {
            let issue = target.and_then(|key| state.issue_mut(key)).ok_or_else(not_found)?;
            let logged = call
                .arguments
                .get(1)
                .and_then(|body| body.get("timeSpentSeconds"))
                .and_then(Value::as_u64)
                .unwrap_or_default();
            issue.fields.timespent = Some(issue.fields.timespent.unwrap_or_default() + logged);
            Ok(json!({}))
        }
        ApiMethod::UpdateIssue => {
            let fields = call
                .arguments
                .get(1)
                .and_then(|body| body.get("fields"))
                .cloned()
                .unwrap_or(Value::Null);
            let issue = target.and_then(|key| state.issue_mut(key)).ok_or_else(not_found)?;
            if let Some(description) = fields.get("description").and_then(Value::as_str) {
                issue.fields.description = Some(description.to_owned());
            }
            if let Some(name) = fields.pointer("/assignee/name").and_then(Value::as_str) {
                issue.fields.assignee = Some(TrackerUser {
                    key: Some(name.to_owned()),
                    name: Some(name.to_owned()),
                    display_name: None,
                });
            }
            Ok(json!({}))
        }
        ApiMethod::SearchJira => to_value(&IssueSearchResult {
            issues: state.search_results.clone(),
        }),
        ApiMethod::SearchUsers => to_value(&state.users),
    }
}

fn not_found() -> String {
    "Issue Does Not Exist".to_owned()
}

fn to_value(payload: &impl Serialize) -> Result<Value, String> {
    serde_json::to_value(payload).map_err(|err| err.to_string())
}
