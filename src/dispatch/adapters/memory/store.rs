//! In-memory task store for dispatch tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use crate::dispatch::{
    domain::{CourierId, OrganizationId, Task, TaskId, TaskStatus},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
///
/// The single write lock is the store's serialization point: the conditional
/// updates check their preconditions and apply the write under one guard, so
/// concurrent claims of the same task have exactly one winner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    organization_index: HashMap<OrganizationId, Vec<TaskId>>,
    courier_index: HashMap<CourierId, Vec<TaskId>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn index_courier(state: &mut InMemoryTaskState, task: &Task) {
    if let Some(courier_id) = task.courier_id() {
        state
            .courier_index
            .entry(courier_id)
            .or_default()
            .push(task.id());
    }
}

/// Removes a task ID from the courier index, cleaning up the entry if empty.
fn remove_from_courier_index(
    index: &mut HashMap<CourierId, Vec<TaskId>>,
    task_id: TaskId,
    courier_id: CourierId,
) {
    if let Some(ids) = index.get_mut(&courier_id) {
        ids.retain(|id| *id != task_id);
        if ids.is_empty() {
            index.remove(&courier_id);
        }
    }
}

/// Moves a task between courier index entries when its holder changed.
fn reindex_courier(state: &mut InMemoryTaskState, task: &Task, old_courier: Option<CourierId>) {
    if old_courier == task.courier_id() {
        return;
    }
    if let Some(previous) = old_courier {
        remove_from_courier_index(&mut state.courier_index, task.id(), previous);
    }
    index_courier(state, task);
}

/// Helper to look up tasks by index key, keeping those passing `keep`.
fn find_by_index<K>(
    state: &InMemoryTaskState,
    index: &HashMap<K, Vec<TaskId>>,
    key: &K,
    keep: impl Fn(&Task) -> bool,
) -> Vec<Task>
where
    K: Eq + Hash,
{
    index
        .get(key)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.tasks.get(id))
                .filter(|task| keep(task))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskStoreError::unavailable(std::io::Error::other(err.to_string())))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }

        state
            .organization_index
            .entry(task.organization_id())
            .or_default()
            .push(task.id());
        index_courier(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update_transition(&self, task: &Task, expected: &[TaskStatus]) -> TaskStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskStoreError::unavailable(std::io::Error::other(err.to_string())))?;

        let (stored_status, stored_courier) = {
            let stored = state
                .tasks
                .get(&task.id())
                .ok_or(TaskStoreError::NotFound(task.id()))?;
            (stored.status(), stored.courier_id())
        };
        if !expected.contains(&stored_status) {
            return Err(TaskStoreError::StaleStatus {
                task_id: task.id(),
                status: stored_status,
            });
        }

        reindex_courier(&mut state, task, stored_courier);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_claim(&self, task: &Task, expected: &[TaskStatus]) -> TaskStoreResult<()> {
        let claimant = task.courier_id();
        let mut state = self
            .state
            .write()
            .map_err(|err| TaskStoreError::unavailable(std::io::Error::other(err.to_string())))?;

        let (stored_status, stored_courier) = {
            let stored = state
                .tasks
                .get(&task.id())
                .ok_or(TaskStoreError::NotFound(task.id()))?;
            (stored.status(), stored.courier_id())
        };
        // A courier left on a terminal record is history, not a live hold.
        if stored_status.is_terminal() {
            return Err(TaskStoreError::StaleStatus {
                task_id: task.id(),
                status: stored_status,
            });
        }
        if let Some(holder) = stored_courier.filter(|held| Some(*held) != claimant) {
            return Err(TaskStoreError::HeldByOther {
                task_id: task.id(),
                holder,
            });
        }
        if !expected.contains(&stored_status) {
            return Err(TaskStoreError::StaleStatus {
                task_id: task.id(),
                status: stored_status,
            });
        }

        reindex_courier(&mut state, task, stored_courier);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn list_unassigned(&self, organization_id: OrganizationId) -> TaskStoreResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(find_by_index(
            &state,
            &state.organization_index,
            &organization_id,
            |task| task.courier_id().is_none() && !task.status().is_terminal(),
        ))
    }

    async fn list_for_courier(&self, courier_id: CourierId) -> TaskStoreResult<Vec<Task>> {
        let state = self
            .state
            .read()
            .map_err(|err| TaskStoreError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(find_by_index(
            &state,
            &state.courier_index,
            &courier_id,
            |task| task.status() != TaskStatus::Cancelled,
        ))
    }
}
