//! In-memory adapters for tests and embedding hosts without a backend.

mod clock;
mod connectivity;
mod dialog;
mod notifier;
mod repository;
mod tracker;

pub use clock::FixedClock;
pub use connectivity::StaticConnectivity;
pub use dialog::ScriptedDialogs;
pub use notifier::RecordingNotifier;
pub use repository::InMemoryTaskRepository;
pub use tracker::{InMemoryIssueTracker, RecordedCall};
