//! Application services for tracker synchronisation.

mod client;
mod error;
mod import;
mod multiplexer;
mod poller;
mod precheck;
mod reconciler;
mod workflow;

pub use client::TrackerClient;
pub use error::{PreconditionError, RequestError, SyncError, SyncResult};
pub use import::IssueImportService;
pub use multiplexer::RequestMultiplexer;
pub use poller::{BatchPoller, PollSummary};
pub use precheck::Precheck;
pub use reconciler::{NotifyMode, ReconcileOutcome, SyncReconciler, merge_remote_issue};
pub use workflow::{StatusUpdate, WorkflowOrchestrator, WorklogOutcome};
