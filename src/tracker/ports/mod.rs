//! Port contracts for tracker synchronisation.
//!
//! Ports define infrastructure-agnostic interfaces for every collaborator the
//! services depend on.

pub mod connectivity;
pub mod dialog;
pub mod notifier;
pub mod repository;
pub mod transport;

pub use connectivity::Connectivity;
pub use dialog::{DialogError, TrackerDialogs, TransitionPrompt, WorklogDraft};
pub use notifier::{Notification, Notifier, ToastSeverity};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use transport::{TrackerTransport, TransportDispatchError};
