//! Lifecycle integration tests: creation through confirmation and
//! cancellation over the in-memory store.

use crate::in_memory::helpers::{Dispatch, create_claimed_task, dispatch, fetch_task};
use eyre::{bail, ensure};
use reparto::dispatch::{
    domain::{
        ClientId, CourierId, CounterpartyKey, OrganizationId, Priority, ProviderId,
        StructuredAddress, TaskAddress, TaskKind, TaskStatus,
    },
    services::CreateTaskRequest,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_round_trips_its_full_payload(dispatch: Dispatch) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let client = ClientId::new();
    let linked = dispatch
        .lifecycle
        .create_task(CreateTaskRequest::new(organization_id, TaskKind::Retire))
        .await?;

    let created = dispatch
        .lifecycle
        .create_task(
            CreateTaskRequest::new(organization_id, TaskKind::Deliver)
                .with_client(client, "Studio Rossi")
                .with_address(TaskAddress::Structured(
                    StructuredAddress::new("Via Garibaldi 3", "Torino").with_postal_code("10122"),
                ))
                .with_scheduled_date("2025-06-02")
                .with_priority(Priority::Urgent)
                .with_photo_required(false)
                .with_linked_task(linked.id()),
        )
        .await?;

    let stored = fetch_task(&dispatch, &created).await?;
    ensure!(stored == created);
    ensure!(stored.kind() == TaskKind::Deliver);
    let Some(counterparty) = stored.counterparty() else {
        bail!("expected a counterparty on the stored task");
    };
    ensure!(counterparty.key() == CounterpartyKey::Client(client));
    ensure!(counterparty.name().as_str() == "Studio Rossi");
    ensure!(stored.address().label().as_deref() == Some("Via Garibaldi 3, Torino"));
    ensure!(stored.scheduled_date().map(|date| date.to_string()) == Some("2025-06-02".to_owned()));
    ensure!(stored.priority() == Priority::Urgent);
    ensure!(!stored.photo_required());
    ensure!(stored.linked_task_id() == Some(linked.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn preassigned_courier_can_decline_back_to_the_pool(dispatch: Dispatch) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let proposed = CourierId::new();
    let created = dispatch
        .lifecycle
        .create_task(
            CreateTaskRequest::new(organization_id, TaskKind::Deliver).with_courier(proposed),
        )
        .await?;
    ensure!(created.status() == TaskStatus::PendingConfirmation);

    let declined = dispatch
        .assignment
        .unassign_from_courier(created.id())
        .await?;
    ensure!(declined.status() == TaskStatus::Pending);
    ensure!(declined.courier_id().is_none());

    let pool = dispatch.assignment.list_unassigned(organization_id).await?;
    ensure!(pool.iter().any(|task| task.id() == created.id()));

    let other = CourierId::new();
    let claimed = dispatch
        .assignment
        .assign_to_courier(created.id(), other)
        .await?;
    ensure!(claimed.status() == TaskStatus::Confirmed);
    ensure!(claimed.courier_id() == Some(other));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn preassignment_by_a_provider_counterparty_flows_to_confirmation(
    dispatch: Dispatch,
) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let proposed = CourierId::new();
    let created = dispatch
        .lifecycle
        .create_task(
            CreateTaskRequest::new(organization_id, TaskKind::Retire)
                .with_provider(ProviderId::new(), "Deposito Nord")
                .with_courier(proposed),
        )
        .await?;

    let confirmed = dispatch.lifecycle.courier_confirms(created.id()).await?;
    ensure!(confirmed.status() == TaskStatus::Confirmed);
    ensure!(confirmed.courier_id() == Some(proposed));

    let stored = fetch_task(&dispatch, &created).await?;
    ensure!(stored == confirmed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_a_claimed_task_keeps_the_courier_as_history(
    dispatch: Dispatch,
) -> eyre::Result<()> {
    let organization_id = OrganizationId::new();
    let (claimed, courier) =
        create_claimed_task(&dispatch, organization_id, TaskKind::Deliver).await?;

    let cancelled = dispatch.lifecycle.cancel(claimed.id()).await?;
    ensure!(cancelled.status() == TaskStatus::Cancelled);
    ensure!(cancelled.courier_id() == Some(courier));

    let visible = dispatch.assignment.list_for_courier(courier).await?;
    ensure!(visible.iter().all(|task| task.id() != claimed.id()));
    Ok(())
}
