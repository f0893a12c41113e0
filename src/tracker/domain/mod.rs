//! Domain model for tracker synchronisation.
//!
//! Remote issue payloads, the local task snapshot they are mirrored into, the
//! mapping between the two, validated settings and the wire messages
//! exchanged with the transport. Nothing here performs I/O.

mod error;
mod ids;
mod issue;
mod mapping;
mod request;
mod settings;
mod task;

pub use error::{ParseLocalStatusError, TrackerDomainError};
pub use ids::{CorrelationId, IssueKey, TaskId};
pub use issue::{
    IssueAttachment, IssueChangelog, IssueFields, IssueHistory, IssuePayload, IssueSearchResult,
    RemoteComment, RemoteComments, RemoteStatus, TRACKER_TIMESTAMP_FORMAT, TrackerUser,
    TransitionDescriptor, TransitionList, format_tracker_timestamp, parse_tracker_timestamp,
    tracker_timestamp,
};
pub use mapping::{IssueMapper, MappedIssue};
pub use request::{
    ApiMethod, OutboundRequest, RequestDescriptor, ResponseEnvelope, SEARCH_FIELDS,
    SEARCH_MAX_RESULTS, WorklogEntry,
};
pub use settings::{
    ConfigurationError, ConnectionSettings, DEFAULT_REQUEST_TIMEOUT, RawTrackerSettings,
    TrackerConfig, TrackerSettings, TransitionPolicy, WorklogSettings,
};
pub use task::{ChangelogEntry, IssueComment, LocalStatus, TaskSnapshot};
