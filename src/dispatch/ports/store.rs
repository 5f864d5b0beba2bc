//! Store port for task persistence, lookup, and conditional updates.

use crate::dispatch::domain::{CourierId, OrganizationId, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// Lifecycle writes go through the conditional updates
/// [`TaskStore::update_transition`] and [`TaskStore::update_claim`]. Both
/// check their preconditions against the stored record and apply the write
/// in a single store-side critical section, so two services racing over the
/// same task cannot both win.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the task ID already
    /// exists.
    async fn insert(&self, task: &Task) -> TaskStoreResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Persists a lifecycle transition while the stored status is still in
    /// `expected`.
    ///
    /// This write ignores the stored courier, so it suits only commits whose
    /// outcome does not depend on who holds the task, such as a release.
    /// Holder-sensitive commits go through [`TaskStore::update_claim`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist, or
    /// [`TaskStoreError::StaleStatus`] when a concurrent writer already
    /// moved the task out of `expected`.
    async fn update_transition(&self, task: &Task, expected: &[TaskStatus]) -> TaskStoreResult<()>;

    /// Persists a holder-sensitive lifecycle write: claims, confirmations,
    /// completions, and withdrawals all commit through this method. The
    /// claimant is the courier recorded on `task`; the write applies only
    /// while the stored record is non-terminal, unheld or held by that
    /// courier, and its status is still in `expected`.
    ///
    /// A terminal stored record reports [`TaskStoreError::StaleStatus`]
    /// before its courier is consulted; a courier left on such a record
    /// is history, not a live hold.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist,
    /// [`TaskStoreError::HeldByOther`] when a different courier holds the
    /// stored record, or [`TaskStoreError::StaleStatus`] when the stored
    /// status is terminal or left `expected`.
    async fn update_claim(&self, task: &Task, expected: &[TaskStatus]) -> TaskStoreResult<()>;

    /// Returns the organization's unassigned, non-terminal tasks.
    async fn list_unassigned(&self, organization_id: OrganizationId) -> TaskStoreResult<Vec<Task>>;

    /// Returns the courier's tasks: active ones plus completed history.
    /// Cancelled tasks are excluded.
    async fn list_for_courier(&self, courier_id: CourierId) -> TaskStoreResult<Vec<Task>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A conditional claim found the record held by a different courier.
    #[error("task {task_id} is held by courier {holder}")]
    HeldByOther {
        /// Task whose claim was refused.
        task_id: TaskId,
        /// Courier holding the stored record.
        holder: CourierId,
    },

    /// A conditional update found the stored status outside the expected
    /// set.
    #[error("task {task_id} was concurrently moved to status {status}")]
    StaleStatus {
        /// Task whose update was refused.
        task_id: TaskId,
        /// Status the stored record held when the update arrived.
        status: TaskStatus,
    },

    /// Store-layer failure.
    #[error("task store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a store-layer failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
