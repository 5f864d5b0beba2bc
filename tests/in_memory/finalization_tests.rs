//! Finalization integration tests: evidence gating and photo storage over
//! the in-memory adapters.

use std::sync::Arc;

use crate::in_memory::helpers::{Dispatch, create_claimed_task, dispatch, fetch_task};
use async_trait::async_trait;
use eyre::{bail, ensure};
use mockable::DefaultClock;
use reparto::dispatch::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        CourierId, FinalizationEvidence, OrganizationId, PhotoData, PhotoUrl, TaskDomainError,
        TaskEvent, TaskKind, TaskStatus,
    },
    ports::{PhotoStorage, PhotoStorageError, PhotoStorageResult},
    services::{
        AssignmentService, CreateTaskRequest, FinalizationError, FinalizationService,
        TaskLifecycleService,
    },
};
use rstest::rstest;
use tokio::sync::Notify;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_delivery_records_every_uploaded_photo(dispatch: Dispatch) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let (claimed, _courier) =
        create_claimed_task(&dispatch, organization_id, TaskKind::Deliver).await?;

    let evidence = FinalizationEvidence::new()
        .with_receipt(PhotoData::new(b"signed delivery note".to_vec())?)
        .with_additional_photo(PhotoData::new(b"doorstep overview".to_vec())?)
        .with_additional_photo(PhotoData::new(b"package close-up".to_vec())?);
    let completed = dispatch.finalization.finalize(claimed.id(), evidence).await?;

    ensure!(completed.status() == TaskStatus::Completed);
    let Some(receipt_url) = completed.receipt_photo_url() else {
        bail!("expected a receipt location on the completed task");
    };
    let [first_extra, second_extra] = completed.additional_photo_urls() else {
        bail!(
            "expected two supplementary locations, got {:?}",
            completed.additional_photo_urls()
        );
    };
    ensure!(receipt_url != first_extra);
    ensure!(first_extra != second_extra);

    ensure!(
        dispatch.photos.stored_bytes(receipt_url) == Some(b"signed delivery note".to_vec()),
        "receipt bytes must round-trip through storage"
    );
    ensure!(dispatch.photos.stored_bytes(first_extra) == Some(b"doorstep overview".to_vec()));
    ensure!(dispatch.photos.stored_bytes(second_extra) == Some(b"package close-up".to_vec()));

    let stored = fetch_task(&dispatch, &claimed).await?;
    ensure!(stored == completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn photo_override_gates_a_collection_end_to_end(dispatch: Dispatch) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let created = dispatch
        .lifecycle
        .create_task(
            CreateTaskRequest::new(organization_id, TaskKind::Retire).with_photo_required(true),
        )
        .await?;
    let courier = CourierId::new();
    dispatch
        .assignment
        .assign_to_courier(created.id(), courier)
        .await?;

    let result = dispatch
        .finalization
        .finalize(created.id(), FinalizationEvidence::new())
        .await;
    let Err(FinalizationError::Domain(TaskDomainError::MissingRequiredEvidence(rejected_id))) =
        &result
    else {
        bail!("expected a missing-evidence rejection, got {result:?}");
    };
    ensure!(*rejected_id == created.id());

    let stored = fetch_task(&dispatch, &created).await?;
    ensure!(stored.status() == TaskStatus::Confirmed);
    ensure!(stored.receipt_photo_url().is_none());

    let completed = dispatch
        .finalization
        .finalize(
            created.id(),
            FinalizationEvidence::new()
                .with_receipt(PhotoData::new(b"collection receipt".to_vec())?),
        )
        .await?;
    ensure!(completed.status() == TaskStatus::Completed);
    ensure!(completed.receipt_photo_url().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_rejects_a_second_finalization(dispatch: Dispatch) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let (claimed, _courier) =
        create_claimed_task(&dispatch, organization_id, TaskKind::Retire).await?;
    let completed = dispatch
        .finalization
        .finalize(claimed.id(), FinalizationEvidence::new())
        .await?;
    ensure!(completed.status() == TaskStatus::Completed);

    let result = dispatch
        .finalization
        .finalize(claimed.id(), FinalizationEvidence::new())
        .await;
    let Err(FinalizationError::Domain(TaskDomainError::InvalidTransition {
        status, event, ..
    })) = &result
    else {
        bail!("expected an invalid-transition rejection, got {result:?}");
    };
    ensure!(*status == TaskStatus::Completed);
    ensure!(*event == TaskEvent::Finalize);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identical_photo_bytes_share_one_stored_location(dispatch: Dispatch) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let receipt_bytes = b"same receipt scan".to_vec();

    let (first_task, _) = create_claimed_task(&dispatch, organization_id, TaskKind::Deliver).await?;
    let (second_task, _) =
        create_claimed_task(&dispatch, organization_id, TaskKind::Deliver).await?;

    let first_completed = dispatch
        .finalization
        .finalize(
            first_task.id(),
            FinalizationEvidence::new().with_receipt(PhotoData::new(receipt_bytes.clone())?),
        )
        .await?;
    let second_completed = dispatch
        .finalization
        .finalize(
            second_task.id(),
            FinalizationEvidence::new().with_receipt(PhotoData::new(receipt_bytes.clone())?),
        )
        .await?;

    let (Some(first_url), Some(second_url)) = (
        first_completed.receipt_photo_url(),
        second_completed.receipt_photo_url(),
    ) else {
        bail!("expected receipt locations on both completed tasks");
    };
    ensure!(
        first_url == second_url,
        "content-addressed storage must deduplicate identical bytes"
    );
    ensure!(dispatch.photos.stored_bytes(first_url) == Some(receipt_bytes));
    Ok(())
}

/// Photo storage that parks the upload until the test releases it.
#[derive(Debug, Default)]
struct GatedPhotoStorage {
    upload_started: Notify,
    release_upload: Notify,
}

#[async_trait]
impl PhotoStorage for GatedPhotoStorage {
    async fn store(&self, _photo: &PhotoData) -> PhotoStorageResult<PhotoUrl> {
        self.upload_started.notify_one();
        self.release_upload.notified().await;
        PhotoUrl::new("memory://photos/gated-receipt").map_err(PhotoStorageError::upload_failed)
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn reclaim_during_upload_beats_the_stale_completion() -> eyre::Result<()> {
    let store = Arc::new(InMemoryTaskStore::new());
    let photos = Arc::new(GatedPhotoStorage::default());
    let clock = Arc::new(DefaultClock);
    let lifecycle = TaskLifecycleService::new(Arc::clone(&store), Arc::clone(&clock));
    let assignment = AssignmentService::new(Arc::clone(&store), Arc::clone(&clock));
    let finalization = FinalizationService::new(store, Arc::clone(&photos), clock);

    let created = lifecycle
        .create_task(CreateTaskRequest::new(
            OrganizationId::new(),
            TaskKind::Deliver,
        ))
        .await?;
    let first_courier = CourierId::new();
    assignment
        .assign_to_courier(created.id(), first_courier)
        .await?;

    let claimed_id = created.id();
    let evidence =
        FinalizationEvidence::new().with_receipt(PhotoData::new(b"late receipt scan".to_vec())?);
    let parked = tokio::spawn(async move { finalization.finalize(claimed_id, evidence).await });
    photos.upload_started.notified().await;

    // The task changes hands while the upload is parked.
    assignment.unassign_from_courier(created.id()).await?;
    let second_courier = CourierId::new();
    assignment
        .assign_to_courier(created.id(), second_courier)
        .await?;
    photos.release_upload.notify_one();

    let result = parked.await?;
    let Err(FinalizationError::Domain(TaskDomainError::AlreadyAssigned { task_id, holder })) =
        &result
    else {
        bail!("expected the stale completion to lose, got {result:?}");
    };
    ensure!(*task_id == created.id());
    ensure!(*holder == second_courier);

    let stored = lifecycle
        .find_by_id(created.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task {} not found in store", created.id()))?;
    ensure!(stored.status() == TaskStatus::Confirmed);
    ensure!(stored.courier_id() == Some(second_courier));
    ensure!(stored.receipt_photo_url().is_none());

    let courier_tasks = assignment.list_for_courier(second_courier).await?;
    ensure!(courier_tasks.iter().any(|held| held.id() == created.id()));
    Ok(())
}
