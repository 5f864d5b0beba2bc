//! Shared fixtures for in-memory dispatch integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use reparto::dispatch::{
    adapters::memory::{InMemoryPhotoStorage, InMemoryTaskStore},
    domain::{CourierId, OrganizationId, Task, TaskKind},
    services::{
        AssignmentService, CreateTaskRequest, FinalizationService, TaskLifecycleError,
        TaskLifecycleService,
    },
};
use rstest::fixture;

/// Dispatch services wired over one shared in-memory store.
pub struct Dispatch {
    pub lifecycle: TaskLifecycleService<InMemoryTaskStore, DefaultClock>,
    pub assignment: AssignmentService<InMemoryTaskStore, DefaultClock>,
    pub finalization: FinalizationService<InMemoryTaskStore, InMemoryPhotoStorage, DefaultClock>,
    pub photos: Arc<InMemoryPhotoStorage>,
}

/// Provides dispatch services over a fresh store for each test.
#[fixture]
pub fn dispatch() -> Dispatch {
    let store = Arc::new(InMemoryTaskStore::new());
    let photos = Arc::new(InMemoryPhotoStorage::new());
    let clock = Arc::new(DefaultClock);
    Dispatch {
        lifecycle: TaskLifecycleService::new(Arc::clone(&store), Arc::clone(&clock)),
        assignment: AssignmentService::new(Arc::clone(&store), Arc::clone(&clock)),
        finalization: FinalizationService::new(store, Arc::clone(&photos), clock),
        photos,
    }
}

/// Creates an unassigned task of the given kind for the organization.
///
/// # Errors
///
/// Returns an error if task creation fails.
pub async fn create_task(
    dispatch: &Dispatch,
    organization_id: OrganizationId,
    kind: TaskKind,
) -> Result<Task, TaskLifecycleError> {
    dispatch
        .lifecycle
        .create_task(CreateTaskRequest::new(organization_id, kind))
        .await
}

/// Creates a task and claims it for a fresh courier, returning both.
///
/// # Errors
///
/// Returns an error if the creation or the claim fails.
pub async fn create_claimed_task(
    dispatch: &Dispatch,
    organization_id: OrganizationId,
    kind: TaskKind,
) -> Result<(Task, CourierId), eyre::Report> {
    let created = create_task(dispatch, organization_id, kind).await?;
    let courier = CourierId::new();
    let claimed = dispatch
        .assignment
        .assign_to_courier(created.id(), courier)
        .await?;
    Ok((claimed, courier))
}

/// Looks up a task that the scenario expects to exist.
///
/// # Errors
///
/// Returns an error if the lookup fails or the task is missing.
pub async fn fetch_task(dispatch: &Dispatch, task: &Task) -> Result<Task, eyre::Report> {
    dispatch
        .lifecycle
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task {} not found in store", task.id()))
}
