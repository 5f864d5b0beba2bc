//! Service layer for task creation, confirmation, and cancellation.

use crate::dispatch::{
    domain::{
        ClientId, Counterparty, CourierId, NewTaskParams, OrganizationId, Priority, ProviderId,
        Task, TaskAddress, TaskDomainError, TaskEvent, TaskId, TaskKind, parse_scheduled_date,
    },
    ports::{TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Counterparty intent carried on a creation request before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CounterpartyRequest {
    Client { id: ClientId, name: String },
    Provider { id: ProviderId, name: String },
}

/// Request payload for creating a task.
///
/// Boundary values (the counterparty name, the scheduled date string) are
/// validated when the request is executed, not when it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    organization_id: OrganizationId,
    kind: TaskKind,
    counterparty: Option<CounterpartyRequest>,
    address: TaskAddress,
    scheduled_date: Option<String>,
    priority: Priority,
    photo_required: Option<bool>,
    linked_task_id: Option<TaskId>,
    courier_id: Option<CourierId>,
}

impl CreateTaskRequest {
    /// Creates a request with required task fields.
    #[must_use]
    pub const fn new(organization_id: OrganizationId, kind: TaskKind) -> Self {
        Self {
            organization_id,
            kind,
            counterparty: None,
            address: TaskAddress::Unspecified,
            scheduled_date: None,
            priority: Priority::Normal,
            photo_required: None,
            linked_task_id: None,
            courier_id: None,
        }
    }

    /// Sets a client counterparty. Replaces any counterparty set earlier.
    #[must_use]
    pub fn with_client(mut self, id: ClientId, name: impl Into<String>) -> Self {
        self.counterparty = Some(CounterpartyRequest::Client {
            id,
            name: name.into(),
        });
        self
    }

    /// Sets a provider counterparty. Replaces any counterparty set earlier.
    #[must_use]
    pub fn with_provider(mut self, id: ProviderId, name: impl Into<String>) -> Self {
        self.counterparty = Some(CounterpartyRequest::Provider {
            id,
            name: name.into(),
        });
        self
    }

    /// Sets the fulfilment address.
    #[must_use]
    pub fn with_address(mut self, address: TaskAddress) -> Self {
        self.address = address;
        self
    }

    /// Sets the scheduled date as a boundary `YYYY-MM-DD` string.
    #[must_use]
    pub fn with_scheduled_date(mut self, date: impl Into<String>) -> Self {
        self.scheduled_date = Some(date.into());
        self
    }

    /// Sets the presentation priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Overrides the kind's default receipt-photo requirement.
    #[must_use]
    pub fn with_photo_required(mut self, photo_required: bool) -> Self {
        self.photo_required = Some(photo_required);
        self
    }

    /// Links the new task to the task it was cloned from.
    #[must_use]
    pub fn with_linked_task(mut self, linked_task_id: TaskId) -> Self {
        self.linked_task_id = Some(linked_task_id);
        self
    }

    /// Pre-assigns a courier; the task is created awaiting their
    /// confirmation.
    #[must_use]
    pub fn with_courier(mut self, courier_id: CourierId) -> Self {
        self.courier_id = Some(courier_id);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task and stores it.
    ///
    /// With a pre-assigned courier the task is created in
    /// `PendingConfirmation`, awaiting [`Self::courier_confirms`]; otherwise
    /// it starts unassigned in `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when a boundary value fails
    /// validation, or [`TaskLifecycleError::Store`] when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let CreateTaskRequest {
            organization_id,
            kind,
            counterparty,
            address,
            scheduled_date,
            priority,
            photo_required,
            linked_task_id,
            courier_id,
        } = request;

        let mut params = NewTaskParams::new(organization_id, kind)
            .with_address(address)
            .with_priority(priority);
        if let Some(counterparty_request) = counterparty {
            params = params.with_counterparty(build_counterparty(counterparty_request)?);
        }
        if let Some(raw_date) = scheduled_date {
            params = params.with_scheduled_date(parse_scheduled_date(&raw_date)?);
        }
        if let Some(required) = photo_required {
            params = params.with_photo_required(required);
        }
        if let Some(linked) = linked_task_id {
            params = params.with_linked_task(linked);
        }

        let mut task = Task::new(params, &*self.clock);
        if let Some(courier) = courier_id {
            task.assign(courier, &*self.clock)?;
        }
        self.store.insert(&task).await?;
        Ok(task)
    }

    /// Records the pre-assigned courier's confirmation of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the task is not
    /// awaiting confirmation, [`TaskDomainError::AlreadyAssigned`] when the
    /// task changed hands before the confirmation landed,
    /// [`TaskStoreError::NotFound`] when it does not exist, or
    /// [`TaskLifecycleError::Store`] when persistence fails.
    pub async fn courier_confirms(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        task.confirm(&*self.clock)?;
        self.store
            .update_claim(&task, TaskEvent::Confirm.allowed_from())
            .await
            .map_err(|err| transition_conflict(err, TaskEvent::Confirm))?;
        Ok(task)
    }

    /// Withdraws a task from any non-terminal status.
    ///
    /// The withdrawal commits through the holder-checking conditional write,
    /// so a snapshot taken before a rival claim landed loses rather than
    /// erasing the new holder.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the task already
    /// reached a terminal status, [`TaskDomainError::AlreadyAssigned`] when
    /// the task changed hands before the withdrawal landed,
    /// [`TaskStoreError::NotFound`] when it does not exist, or
    /// [`TaskLifecycleError::Store`] when persistence fails.
    pub async fn cancel(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        task.cancel(&*self.clock)?;
        self.store
            .update_claim(&task, TaskEvent::Cancel.allowed_from())
            .await
            .map_err(|err| transition_conflict(err, TaskEvent::Cancel))?;
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when no task has the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the store lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.store.find_by_id(task_id).await?)
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| TaskStoreError::NotFound(task_id).into())
    }
}

/// Validates the counterparty intent captured on a creation request.
fn build_counterparty(request: CounterpartyRequest) -> Result<Counterparty, TaskDomainError> {
    match request {
        CounterpartyRequest::Client { id, name } => Counterparty::client(id, name),
        CounterpartyRequest::Provider { id, name } => Counterparty::provider(id, name),
    }
}

/// Maps a lost conditional transition onto the domain taxonomy.
fn transition_conflict(err: TaskStoreError, event: TaskEvent) -> TaskLifecycleError {
    match err {
        TaskStoreError::HeldByOther { task_id, holder } => {
            TaskDomainError::AlreadyAssigned { task_id, holder }.into()
        }
        TaskStoreError::StaleStatus { task_id, status } => TaskDomainError::InvalidTransition {
            task_id,
            status,
            event,
        }
        .into(),
        other => other.into(),
    }
}
