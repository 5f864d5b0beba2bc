//! Service layer for evidence-gated task completion.

use crate::dispatch::{
    domain::{
        FinalizationEvidence, PhotoUrl, StoredEvidence, Task, TaskDomainError, TaskEvent, TaskId,
    },
    ports::{PhotoStorage, PhotoStorageError, TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for finalization operations.
#[derive(Debug, Error)]
pub enum FinalizationError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Photo upload failed.
    #[error(transparent)]
    Photos(#[from] PhotoStorageError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for finalization service operations.
pub type FinalizationResult<T> = Result<T, FinalizationError>;

/// Evidence-gated completion orchestration service.
///
/// The evidence rule is checked before any photo leaves the caller's hands,
/// and the task record is only touched after every upload succeeded. A
/// failure at any step leaves the task's status and evidence exactly as
/// they were.
#[derive(Clone)]
pub struct FinalizationService<S, P, C>
where
    S: TaskStore,
    P: PhotoStorage,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    photos: Arc<P>,
    clock: Arc<C>,
}

impl<S, P, C> FinalizationService<S, P, C>
where
    S: TaskStore,
    P: PhotoStorage,
    C: Clock + Send + Sync,
{
    /// Creates a new finalization service.
    #[must_use]
    pub const fn new(store: Arc<S>, photos: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            store,
            photos,
            clock,
        }
    }

    /// Completes a confirmed task, uploading and recording its evidence.
    ///
    /// Uploads happen outside the store lock, so the task may be released
    /// and re-claimed while they run. The completion commits through the
    /// holder-checking conditional write with the snapshot's courier as
    /// claimant, which makes such a stale completion lose instead of
    /// overwriting the new holder.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the task is not
    /// confirmed, [`TaskDomainError::MissingRequiredEvidence`] when the task
    /// demands a receipt photo and none was supplied,
    /// [`TaskDomainError::AlreadyAssigned`] when another courier took the
    /// task over during the uploads, [`FinalizationError::Photos`] when any
    /// upload fails (no evidence is recorded in that case),
    /// [`TaskStoreError::NotFound`] when the task does not exist, or
    /// [`FinalizationError::Store`] when persistence fails.
    pub async fn finalize(
        &self,
        task_id: TaskId,
        evidence: FinalizationEvidence,
    ) -> FinalizationResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        task.ensure_can_finalize(evidence.has_receipt())?;

        let (receipt_photo, additional_photos) = evidence.into_parts();
        let mut receipt_url: Option<PhotoUrl> = None;
        if let Some(photo) = receipt_photo {
            receipt_url = Some(self.photos.store(&photo).await?);
        }
        let mut additional_urls = Vec::with_capacity(additional_photos.len());
        for photo in &additional_photos {
            additional_urls.push(self.photos.store(photo).await?);
        }

        task.finalize(
            StoredEvidence::new(receipt_url, additional_urls),
            &*self.clock,
        )?;
        self.store
            .update_claim(&task, TaskEvent::Finalize.allowed_from())
            .await
            .map_err(finalize_conflict)?;
        Ok(task)
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> FinalizationResult<Task> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| TaskStoreError::NotFound(task_id).into())
    }
}

/// Maps a lost conditional completion onto the domain taxonomy.
fn finalize_conflict(err: TaskStoreError) -> FinalizationError {
    match err {
        TaskStoreError::HeldByOther { task_id, holder } => {
            TaskDomainError::AlreadyAssigned { task_id, holder }.into()
        }
        TaskStoreError::StaleStatus { task_id, status } => TaskDomainError::InvalidTransition {
            task_id,
            status,
            event: TaskEvent::Finalize,
        }
        .into(),
        other => other.into(),
    }
}
