//! Issue search, suggestions and automatic backlog import.

use super::{SyncReconciler, SyncResult};
use crate::tracker::{
    domain::{ConfigurationError, IssueMapper, MappedIssue, TrackerSettings, TrackerUser},
    ports::{TaskRepository, ToastSeverity, TrackerTransport},
};
use std::sync::Arc;
use tracing::info;

/// Brings remote issues into the local backlog.
pub struct IssueImportService<T, R>
where
    T: TrackerTransport,
    R: TaskRepository,
{
    reconciler: Arc<SyncReconciler<T>>,
    repository: Arc<R>,
}

impl<T, R> IssueImportService<T, R>
where
    T: TrackerTransport,
    R: TaskRepository,
{
    /// Creates an import service.
    #[must_use]
    pub const fn new(reconciler: Arc<SyncReconciler<T>>, repository: Arc<R>) -> Self {
        Self {
            reconciler,
            repository,
        }
    }

    /// Searches tracker users by name.
    ///
    /// # Errors
    ///
    /// Returns precondition and request failures.
    pub async fn search_users(&self, query: &str) -> SyncResult<Vec<TrackerUser>> {
        let settings = self.reconciler.precheck().settings()?;
        self.reconciler
            .client()
            .search_users(settings.connection(), query)
            .await
    }

    /// Returns the issues matched by the configured suggestion query.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingSearchQuery`] when no suggestion
    /// query is configured, and precondition and request failures.
    pub async fn suggestions(&self) -> SyncResult<Vec<MappedIssue>> {
        let settings = self.reconciler.precheck().settings()?;
        let Some(query) = settings.suggestion_query() else {
            self.reconciler.notifier().toast(
                ToastSeverity::Error,
                "Tracker: Insufficient settings. Please define a search query.",
            );
            return Err(ConfigurationError::MissingSearchQuery("suggestion").into());
        };

        let issues = self
            .reconciler
            .client()
            .search(settings.connection(), query)
            .await?;
        let mapper = IssueMapper::new(&settings.connection().host);
        Ok(issues.iter().map(|issue| mapper.map(issue)).collect())
    }

    /// Creates backlog tasks for auto-add matches not mirrored locally yet.
    ///
    /// Does nothing when automatic import is off or has no query. Returns
    /// the number of tasks created.
    ///
    /// # Errors
    ///
    /// Returns precondition, request and repository failures. Tasks created
    /// before a repository failure are kept.
    pub async fn import_auto_added(&self) -> SyncResult<usize> {
        let enabled = self
            .reconciler
            .precheck()
            .config()
            .settings()
            .is_some_and(TrackerSettings::auto_add_enabled);
        if !enabled {
            return Ok(0);
        }
        let settings = self.reconciler.precheck().settings()?;
        let Some(query) = settings.auto_add_query() else {
            return Ok(0);
        };

        let issues = self
            .reconciler
            .client()
            .search(settings.connection(), query)
            .await?;
        let mapper = IssueMapper::new(&settings.connection().host);

        let mut created = 0;
        for issue in &issues {
            if self.repository.exists_by_remote_id(&issue.id).await? {
                continue;
            }
            let task = self
                .repository
                .create_and_prepend_to_backlog(mapper.map(issue), true)
                .await?;
            created += 1;
            info!(task_id = %task.id, issue = %issue.key, "imported tracker issue into backlog");
        }
        Ok(created)
    }
}
