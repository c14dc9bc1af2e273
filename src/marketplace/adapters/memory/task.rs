//! In-memory task registry.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::marketplace::{
    domain::{Task, TaskId, UserId},
    ports::{RepositoryError, RepositoryResult, TaskRepository},
};

/// Thread-safe in-memory task registry.
///
/// Tasks are replaced wholesale on update, so readers always observe a
/// consistent snapshot of multi-field lifecycle changes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    customer_index: HashMap<UserId, Vec<TaskId>>,
    tasker_index: HashMap<UserId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn index_tasker(state: &mut InMemoryTaskState, task: &Task) {
    if let Some(assigned) = task.assigned_tasker() {
        state
            .tasker_index
            .entry(assigned.id().clone())
            .or_default()
            .push(task.id());
    }
}

/// Removes a task ID from a user-keyed index, cleaning up the entry if empty.
fn remove_from_index(index: &mut HashMap<UserId, Vec<TaskId>>, task_id: TaskId, key: &UserId) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|id| *id != task_id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

/// Looks up tasks by index key, newest first by posting time.
fn find_by_index(
    state: &InMemoryTaskState,
    index: &HashMap<UserId, Vec<TaskId>>,
    key: &UserId,
) -> Vec<Task> {
    let mut tasks: Vec<Task> = index
        .get(key)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.tasks.get(id).cloned())
                .collect()
        })
        .unwrap_or_default();
    tasks.sort_by_key(|task| Reverse(task.posted_at()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(RepositoryError::DuplicateTask(task.id()));
        }

        state
            .customer_index
            .entry(task.customer_id().clone())
            .or_default()
            .push(task.id());
        index_tasker(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;

        let old_task = state
            .tasks
            .get(&task.id())
            .ok_or(RepositoryError::TaskNotFound(task.id()))?
            .clone();

        // Re-index the tasker assignment; the customer never changes.
        if let Some(old_assigned) = old_task.assigned_tasker() {
            remove_from_index(&mut state.tasker_index, task.id(), old_assigned.id());
        }
        index_tasker(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_by_customer(&self, customer_id: &UserId) -> RepositoryResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        Ok(find_by_index(&state, &state.customer_index, customer_id))
    }

    async fn list_by_tasker(&self, tasker_id: &UserId) -> RepositoryResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        Ok(find_by_index(&state, &state.tasker_index, tasker_id))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by_key(|task| Reverse(task.posted_at()));
        Ok(tasks)
    }
}
