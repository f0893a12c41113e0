//! Tracker integration settings.
//!
//! The host persists settings as loose JSON ([`RawTrackerSettings`]). They are
//! validated once into a [`TrackerConfig`], which either holds a complete
//! [`TrackerSettings`] value or the reason the integration is unavailable.

use super::{LocalStatus, TransitionDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Request timeout applied when the host does not configure one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const ALWAYS_ASK: &str = "ALWAYS_ASK";
const DO_NOT: &str = "DO_NOT";

/// Reasons the tracker integration cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The integration is switched off.
    #[error("tracker integration is disabled")]
    Disabled,

    /// No tracker host is configured.
    #[error("tracker host is not configured")]
    MissingHost,

    /// No user name is configured.
    #[error("tracker user name is not configured")]
    MissingUserName,

    /// No credential is configured.
    #[error("tracker credential is not configured")]
    MissingCredential,

    /// A transition policy key is not a known local status.
    #[error("transition policy configured for unknown local status '{0}'")]
    InvalidTransitionPolicy(String),

    /// Worklog submission is switched off.
    #[error("worklog submission is disabled")]
    WorklogDisabled,

    /// Pushing local descriptions to the tracker is switched off.
    #[error("description sync from local notes is disabled")]
    DescriptionSyncDisabled,

    /// A search operation has no query configured.
    #[error("no {0} query is configured")]
    MissingSearchQuery(&'static str),
}

/// Settings as persisted by the host settings layer.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTrackerSettings {
    /// Master switch.
    pub is_enabled: bool,
    /// Tracker host name or base URL.
    pub host: Option<String>,
    /// Login name.
    pub user_name: Option<String>,
    /// Login credential.
    pub password: Option<String>,
    /// Whether worklogs are submitted at all.
    pub is_worklog_enabled: bool,
    /// Submit worklogs without asking.
    pub is_auto_worklog: bool,
    /// Log sub-task time against the tracked parent.
    pub is_add_worklog_on_sub_task_done: bool,
    /// Push local notes to the issue description.
    pub is_update_issue_from_local: bool,
    /// Local status to policy (`ALWAYS_ASK`, `DO_NOT` or a transition id).
    pub transitions: BTreeMap<String, String>,
    /// Full transition catalog used to name stored transitions.
    pub all_transitions: Vec<TransitionDescriptor>,
    /// Query used for suggestions.
    pub jql_query: Option<String>,
    /// Query used for automatic backlog import.
    pub jql_query_auto_add: Option<String>,
    /// Whether automatic backlog import runs.
    pub is_enabled_auto_add: bool,
    /// Assign tickets using the internal name instead of the login.
    pub use_internal_name: bool,
    /// Internal user name.
    pub internal_name: Option<String>,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: Option<u64>,
}

/// Connection snapshot attached to every outbound request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    /// Tracker host.
    pub host: String,
    /// Login name.
    pub user_name: String,
    /// Login credential.
    pub password: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What to do on the tracker when a task enters a local status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Let the user pick a transition each time.
    AlwaysAsk,
    /// Never transition the remote issue.
    DoNot,
    /// Apply the stored transition.
    Transition(TransitionDescriptor),
}

impl From<&str> for TransitionPolicy {
    fn from(value: &str) -> Self {
        match value.trim() {
            ALWAYS_ASK => Self::AlwaysAsk,
            DO_NOT => Self::DoNot,
            id => Self::Transition(TransitionDescriptor::from_id(id)),
        }
    }
}

/// Worklog behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorklogSettings {
    /// Whether worklogs are submitted at all.
    pub enabled: bool,
    /// Submit without asking.
    pub automatic: bool,
    /// Log sub-task time against the tracked parent.
    pub log_against_parent: bool,
}

/// Validated, complete tracker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    connection: ConnectionSettings,
    worklog: WorklogSettings,
    update_description_from_local: bool,
    transitions: HashMap<LocalStatus, TransitionPolicy>,
    transition_catalog: Vec<TransitionDescriptor>,
    suggestion_query: Option<String>,
    auto_add_query: Option<String>,
    auto_add_enabled: bool,
    internal_name: Option<String>,
    request_timeout: Duration,
}

impl TrackerSettings {
    /// Validates raw settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] that makes the settings
    /// unusable.
    pub fn from_raw(raw: &RawTrackerSettings) -> Result<Self, ConfigurationError> {
        if !raw.is_enabled {
            return Err(ConfigurationError::Disabled);
        }
        let host = non_empty(raw.host.as_deref()).ok_or(ConfigurationError::MissingHost)?;
        let user_name =
            non_empty(raw.user_name.as_deref()).ok_or(ConfigurationError::MissingUserName)?;
        let password = raw
            .password
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or(ConfigurationError::MissingCredential)?;

        let transitions = raw
            .transitions
            .iter()
            .filter(|(_, policy)| !policy.trim().is_empty())
            .map(|(status, policy)| {
                LocalStatus::try_from(status.as_str())
                    .map(|local| (local, TransitionPolicy::from(policy.as_str())))
                    .map_err(|_| ConfigurationError::InvalidTransitionPolicy(status.clone()))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            connection: ConnectionSettings {
                host: host.to_owned(),
                user_name: user_name.to_owned(),
                password: password.to_owned(),
            },
            worklog: WorklogSettings {
                enabled: raw.is_worklog_enabled,
                automatic: raw.is_auto_worklog,
                log_against_parent: raw.is_add_worklog_on_sub_task_done,
            },
            update_description_from_local: raw.is_update_issue_from_local,
            transitions,
            transition_catalog: raw.all_transitions.clone(),
            suggestion_query: non_empty(raw.jql_query.as_deref()).map(str::to_owned),
            auto_add_query: non_empty(raw.jql_query_auto_add.as_deref()).map(str::to_owned),
            auto_add_enabled: raw.is_enabled_auto_add,
            internal_name: raw
                .use_internal_name
                .then(|| non_empty(raw.internal_name.as_deref()).map(str::to_owned))
                .flatten(),
            request_timeout: raw
                .request_timeout_ms
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_millis),
        })
    }

    /// Returns the connection snapshot.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionSettings {
        &self.connection
    }

    /// Returns worklog behaviour flags.
    #[must_use]
    pub const fn worklog(&self) -> WorklogSettings {
        self.worklog
    }

    /// Returns whether local notes are pushed to the issue description.
    #[must_use]
    pub const fn update_description_from_local(&self) -> bool {
        self.update_description_from_local
    }

    /// Returns the stored policy for a local status, if any.
    #[must_use]
    pub fn transition_policy(&self, status: LocalStatus) -> Option<&TransitionPolicy> {
        self.transitions.get(&status)
    }

    /// Looks up a transition in the configured catalog.
    #[must_use]
    pub fn catalog_transition(&self, id: &str) -> Option<&TransitionDescriptor> {
        self.transition_catalog
            .iter()
            .find(|transition| transition.id == id)
    }

    /// Returns the suggestion query.
    #[must_use]
    pub fn suggestion_query(&self) -> Option<&str> {
        self.suggestion_query.as_deref()
    }

    /// Returns the automatic import query.
    #[must_use]
    pub fn auto_add_query(&self) -> Option<&str> {
        self.auto_add_query.as_deref()
    }

    /// Returns whether automatic backlog import runs.
    #[must_use]
    pub const fn auto_add_enabled(&self) -> bool {
        self.auto_add_enabled
    }

    /// Returns the name tickets are assigned to when the user takes them.
    #[must_use]
    pub fn self_assignee(&self) -> &str {
        self.internal_name
            .as_deref()
            .unwrap_or(&self.connection.user_name)
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Tracker configuration: complete settings, or why there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig(Result<Arc<TrackerSettings>, ConfigurationError>);

impl TrackerConfig {
    /// Validates raw settings into a configuration.
    #[must_use]
    pub fn from_raw(raw: &RawTrackerSettings) -> Self {
        Self(TrackerSettings::from_raw(raw).map(Arc::new))
    }

    /// Wraps already validated settings.
    #[must_use]
    pub fn ready(settings: TrackerSettings) -> Self {
        Self(Ok(Arc::new(settings)))
    }

    /// Configuration for a switched-off integration.
    #[must_use]
    pub const fn disabled() -> Self {
        Self(Err(ConfigurationError::Disabled))
    }

    /// Returns the settings, or the reason they are unavailable.
    ///
    /// # Errors
    ///
    /// Returns the stored [`ConfigurationError`].
    pub fn require(&self) -> Result<&TrackerSettings, ConfigurationError> {
        self.0.as_deref().map_err(Clone::clone)
    }

    /// Returns the settings when available.
    #[must_use]
    pub fn settings(&self) -> Option<&TrackerSettings> {
        self.0.as_deref().ok()
    }
}
