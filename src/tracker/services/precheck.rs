//! Precondition gate run before any tracker call.

use super::{PreconditionError, SyncResult};
use crate::tracker::{
    domain::{IssueKey, TaskSnapshot, TrackerConfig, TrackerSettings},
    ports::{Connectivity, Notifier, ToastSeverity},
};
use std::sync::Arc;

/// Checks configuration, task binding and connectivity.
#[derive(Clone)]
pub struct Precheck {
    config: TrackerConfig,
    connectivity: Arc<dyn Connectivity>,
    notifier: Arc<dyn Notifier>,
}

impl Precheck {
    /// Creates a gate over the given configuration and host probes.
    #[must_use]
    pub fn new(
        config: TrackerConfig,
        connectivity: Arc<dyn Connectivity>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            connectivity,
            notifier,
        }
    }

    /// Returns the notifier used for precondition toasts.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Checks preconditions for operations not bound to a task.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, or [`PreconditionError::Offline`].
    pub fn settings(&self) -> SyncResult<&TrackerSettings> {
        let settings = self.config.require()?;
        self.ensure_online()?;
        Ok(settings)
    }

    /// Checks preconditions for operations on `task`.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, [`PreconditionError::NotTracked`] or
    /// [`PreconditionError::Offline`].
    pub fn task(&self, task: &TaskSnapshot) -> SyncResult<(&TrackerSettings, IssueKey)> {
        let settings = self.config.require()?;
        let Some(key) = task.tracked_key() else {
            return Err(self.not_tracked(task).into());
        };
        self.ensure_online()?;
        Ok((settings, key.clone()))
    }

    /// Raises the "not a tracked issue" toast and returns the matching error.
    #[must_use]
    pub fn not_tracked(&self, task: &TaskSnapshot) -> PreconditionError {
        self.notifier.toast(
            ToastSeverity::Error,
            "Tracker request failed: not a tracked issue.",
        );
        PreconditionError::NotTracked(task.id)
    }

    fn ensure_online(&self) -> Result<(), PreconditionError> {
        if self.connectivity.is_online() {
            return Ok(());
        }
        self.notifier
            .toast(ToastSeverity::Error, "Not connected to the Internet.");
        Err(PreconditionError::Offline)
    }
}
