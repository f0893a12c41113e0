//! Repository port for local task lookup and persistence.

use crate::tracker::domain::{MappedIssue, TaskId, TaskSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// The repository is the sole owner of task lifetimes; services only hold
/// copies between a lookup and a [`save`](TaskRepository::save).
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Finds a task by local identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskSnapshot>>;

    /// Returns whether a task mirrors the remote issue with the given id.
    async fn exists_by_remote_id(&self, remote_id: &str) -> TaskRepositoryResult<bool>;

    /// Creates a task from a mapped issue and puts it at the top of the
    /// backlog.
    ///
    /// `from_remote` marks tasks created by an automatic import.
    async fn create_and_prepend_to_backlog(
        &self,
        issue: MappedIssue,
        from_remote: bool,
    ) -> TaskRepositoryResult<TaskSnapshot>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn save(&self, task: &TaskSnapshot) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
