//! Error taxonomy shared by the tracker services.

use crate::tracker::{
    domain::{ApiMethod, ConfigurationError, LocalStatus, TaskId},
    ports::{DialogError, TaskRepositoryError, TransportDispatchError},
};
use thiserror::Error;

/// Failures of a single multiplexed request.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The transport answered with an error envelope.
    #[error("tracker request {method} failed: {cause}")]
    Transport {
        /// Failing API method.
        method: ApiMethod,
        /// Error description from the transport.
        cause: String,
    },

    /// No response arrived within the configured window.
    #[error("tracker request {method} timed out")]
    Timeout {
        /// Failing API method.
        method: ApiMethod,
    },

    /// The request could not be written to the transport channel.
    #[error("tracker request {method} could not be dispatched: {source}")]
    Dispatch {
        /// Failing API method.
        method: ApiMethod,
        /// Channel failure.
        #[source]
        source: TransportDispatchError,
    },

    /// The multiplexer shut down while the request was pending.
    #[error("tracker request {method} abandoned on shutdown")]
    Closed {
        /// Failing API method.
        method: ApiMethod,
    },
}

impl RequestError {
    /// Returns the API method of the failed request.
    #[must_use]
    pub const fn method(&self) -> ApiMethod {
        match self {
            Self::Transport { method, .. }
            | Self::Timeout { method }
            | Self::Dispatch { method, .. }
            | Self::Closed { method } => *method,
        }
    }
}

/// Operation invoked in a state where it cannot run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreconditionError {
    /// The task is not bound to a remote issue.
    #[error("task {0} is not a tracked issue")]
    NotTracked(TaskId),

    /// The host has no network access.
    #[error("not connected to the internet")]
    Offline,

    /// A worklog is missing its start time or duration.
    #[error("not enough parameters for worklog on task {0}")]
    IncompleteWorklog(TaskId),

    /// No assignee was given.
    #[error("assignee must not be empty")]
    MissingAssignee,

    /// The task notes are not text.
    #[error("task {0} has no notes to push as description")]
    MissingNotes(TaskId),
}

/// Service-level errors for tracker operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Integration disabled or incomplete.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Operation not applicable in the current state.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Multiplexed request failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The stored transition policy says not to sync this status.
    #[error("transitions to {} are configured not to sync", .status.as_str())]
    PolicyRejection {
        /// Requested local status.
        status: LocalStatus,
    },

    /// The user cancelled, or the dialog failed.
    #[error(transparent)]
    Dialog(#[from] DialogError),

    /// The transport returned a payload of unexpected shape.
    #[error("unexpected payload for {method}: {source}")]
    Payload {
        /// API method whose payload failed to decode.
        method: ApiMethod,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// Task repository failure.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for tracker service operations.
pub type SyncResult<T> = Result<T, SyncError>;
