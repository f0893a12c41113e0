//! In-memory task repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tracker::{
    domain::{MappedIssue, TaskId, TaskSnapshot},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository with an ordered backlog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, TaskSnapshot>,
    backlog: Vec<TaskId>,
    from_remote: HashSet<TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `task`, replacing any task with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn insert(&self, task: TaskSnapshot) -> TaskRepositoryResult<()> {
        self.write()?.tasks.insert(task.id, task);
        Ok(())
    }

    /// Returns the backlog order, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn backlog(&self) -> TaskRepositoryResult<Vec<TaskId>> {
        Ok(self.read()?.backlog.clone())
    }

    /// Returns whether `id` was created by an automatic import.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the lock is poisoned.
    pub fn is_from_remote(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        Ok(self.read()?.from_remote.contains(&id))
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskSnapshot>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn exists_by_remote_id(&self, remote_id: &str) -> TaskRepositoryResult<bool> {
        Ok(self
            .read()?
            .tasks
            .values()
            .any(|task| task.original_id.as_deref() == Some(remote_id)))
    }

    async fn create_and_prepend_to_backlog(
        &self,
        issue: MappedIssue,
        from_remote: bool,
    ) -> TaskRepositoryResult<TaskSnapshot> {
        let task = issue.into_task();
        let mut state = self.write()?;
        state.backlog.insert(0, task.id);
        if from_remote {
            state.from_remote.insert(task.id);
        }
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn save(&self, task: &TaskSnapshot) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id)
            .ok_or(TaskRepositoryError::NotFound(task.id))?;
        stored.clone_from(task);
        Ok(())
    }
}
