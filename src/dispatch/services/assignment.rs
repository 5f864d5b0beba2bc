//! Service layer for courier assignment and queue retrieval.

use crate::dispatch::{
    domain::{
        CourierId, CourierQueue, OrganizationId, Task, TaskDomainError, TaskEvent, TaskId,
        TaskStatus, build_queue,
    },
    ports::{TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for assignment service operations.
pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Courier assignment orchestration service.
///
/// Claims go through the store's conditional writes, so two couriers racing
/// for the same task see exactly one winner; the loser gets
/// [`TaskDomainError::AlreadyAssigned`] naming the courier that won.
#[derive(Clone)]
pub struct AssignmentService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> AssignmentService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new assignment service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Returns the organization's unassigned, non-terminal tasks.
    ///
    /// The result is unordered; queue ordering belongs to
    /// [`Self::queue_for_courier`].
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Store`] when the store lookup fails.
    pub async fn list_unassigned(
        &self,
        organization_id: OrganizationId,
    ) -> AssignmentResult<Vec<Task>> {
        Ok(self.store.list_unassigned(organization_id).await?)
    }

    /// Claims a task for a courier: assignment and confirmation in one step.
    ///
    /// Claiming a task the courier already holds succeeds without touching
    /// the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyAssigned`] when a different courier
    /// holds the task (including losing a concurrent claim race),
    /// [`TaskDomainError::InvalidTransition`] when the task is not in an
    /// assignable status (a completed or cancelled task reports this even
    /// when its last courier is still on record),
    /// [`TaskStoreError::NotFound`] when the task does not exist, or
    /// [`AssignmentError::Store`] when persistence fails.
    pub async fn assign_to_courier(
        &self,
        task_id: TaskId,
        courier_id: CourierId,
    ) -> AssignmentResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        if !task.status().is_terminal() && task.courier_id() == Some(courier_id) {
            return Ok(task);
        }

        task.self_assign(courier_id, &*self.clock)?;
        self.store
            .update_claim(&task, TaskEvent::Assign.allowed_from())
            .await
            .map_err(claim_conflict)?;
        Ok(task)
    }

    /// Releases a task back to the unassigned pool.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAssigned`] when no courier holds the
    /// task, [`TaskDomainError::InvalidTransition`] when the task is in a
    /// terminal status, [`TaskStoreError::NotFound`] when the task does not
    /// exist, or [`AssignmentError::Store`] when persistence fails.
    pub async fn unassign_from_courier(&self, task_id: TaskId) -> AssignmentResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        task.unassign(&*self.clock)?;
        self.store
            .update_transition(&task, TaskEvent::Unassign.allowed_from())
            .await
            .map_err(release_conflict)?;
        Ok(task)
    }

    /// Returns the courier's tasks: active ones plus completed history.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Store`] when the store lookup fails.
    pub async fn list_for_courier(&self, courier_id: CourierId) -> AssignmentResult<Vec<Task>> {
        Ok(self.store.list_for_courier(courier_id).await?)
    }

    /// Builds the courier's deterministic queue over their active tasks.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError::Store`] when the store lookup fails.
    pub async fn queue_for_courier(&self, courier_id: CourierId) -> AssignmentResult<CourierQueue> {
        let active: Vec<Task> = self
            .store
            .list_for_courier(courier_id)
            .await?
            .into_iter()
            .filter(|task| !task.status().is_terminal())
            .collect();
        Ok(build_queue(&active))
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> AssignmentResult<Task> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| TaskStoreError::NotFound(task_id).into())
    }
}

/// Maps a lost conditional claim onto the domain taxonomy.
fn claim_conflict(err: TaskStoreError) -> AssignmentError {
    match err {
        TaskStoreError::HeldByOther { task_id, holder } => {
            TaskDomainError::AlreadyAssigned { task_id, holder }.into()
        }
        TaskStoreError::StaleStatus { task_id, status } => TaskDomainError::InvalidTransition {
            task_id,
            status,
            event: TaskEvent::Assign,
        }
        .into(),
        other => other.into(),
    }
}

/// Maps a lost conditional release onto the domain taxonomy.
///
/// A release that finds the task already back in `Pending` lost to another
/// release; the caller is told the task has no courier to release.
fn release_conflict(err: TaskStoreError) -> AssignmentError {
    match err {
        TaskStoreError::StaleStatus {
            task_id,
            status: TaskStatus::Pending,
        } => TaskDomainError::NotAssigned(task_id).into(),
        TaskStoreError::StaleStatus { task_id, status } => TaskDomainError::InvalidTransition {
            task_id,
            status,
            event: TaskEvent::Unassign,
        }
        .into(),
        other => other.into(),
    }
}
