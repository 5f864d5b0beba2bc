//! Then steps for courier workflow BDD scenarios.

use super::world::{CourierWorkflowWorld, run_async};
use eyre::WrapErr;
use reparto::dispatch::{
    domain::{Task, TaskDomainError, TaskStatus},
    services::{AssignmentError, FinalizationError},
};
use rstest_bdd_macros::then;

/// Returns the scenario's current task.
fn current_task(world: &CourierWorkflowWorld) -> Result<&Task, eyre::Report> {
    world
        .current_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))
}

#[then(r#"the task is held by courier "{name}""#)]
fn task_is_held_by_courier(world: &CourierWorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let courier = world
        .couriers
        .get(&name)
        .copied()
        .ok_or_else(|| eyre::eyre!("unknown courier {name} in scenario"))?;
    let task = current_task(world)?;

    if task.status() != TaskStatus::Confirmed {
        return Err(eyre::eyre!(
            "expected status confirmed, found {}",
            task.status()
        ));
    }
    if task.courier_id() != Some(courier) {
        return Err(eyre::eyre!(
            "expected the task to be held by {name}, found {:?}",
            task.courier_id()
        ));
    }
    Ok(())
}

#[then(r#"the claim is rejected because courier "{name}" already holds it"#)]
fn claim_rejected_for_holder(
    world: &CourierWorkflowWorld,
    name: String,
) -> Result<(), eyre::Report> {
    let holder = world
        .couriers
        .get(&name)
        .copied()
        .ok_or_else(|| eyre::eyre!("unknown courier {name} in scenario"))?;
    let result = world
        .last_claim_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing claim result"))?;

    let Err(AssignmentError::Domain(TaskDomainError::AlreadyAssigned {
        holder: reported, ..
    })) = result
    else {
        return Err(eyre::eyre!(
            "expected an already-assigned error, got {result:?}"
        ));
    };
    if *reported != holder {
        return Err(eyre::eyre!("expected holder {holder}, got {reported}"));
    }
    Ok(())
}

#[then("the task returns to the unassigned pool")]
fn task_returns_to_pool(world: &CourierWorkflowWorld) -> Result<(), eyre::Report> {
    let task = current_task(world)?;
    if task.status() != TaskStatus::Pending {
        return Err(eyre::eyre!(
            "expected status pending, found {}",
            task.status()
        ));
    }
    if task.courier_id().is_some() {
        return Err(eyre::eyre!(
            "expected no assigned courier, found {:?}",
            task.courier_id()
        ));
    }

    let pool = run_async(world.assignment.list_unassigned(world.organization_id))
        .wrap_err("list unassigned tasks in scenario")?;
    if !pool.iter().any(|candidate| candidate.id() == task.id()) {
        return Err(eyre::eyre!(
            "released task is missing from the unassigned pool"
        ));
    }
    Ok(())
}

#[then("the completion is rejected for missing evidence")]
fn completion_rejected_for_missing_evidence(
    world: &CourierWorkflowWorld,
) -> Result<(), eyre::Report> {
    let result = world
        .last_finalize_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing finalize result"))?;

    if !matches!(
        result,
        Err(FinalizationError::Domain(
            TaskDomainError::MissingRequiredEvidence(_)
        ))
    ) {
        return Err(eyre::eyre!(
            "expected MissingRequiredEvidence error, got {result:?}"
        ));
    }
    Ok(())
}

#[then("the task remains claimed")]
fn task_remains_claimed(world: &CourierWorkflowWorld) -> Result<(), eyre::Report> {
    let task = current_task(world)?;
    let stored = run_async(world.lifecycle.find_by_id(task.id()))
        .wrap_err("fetch task in scenario")?
        .ok_or_else(|| eyre::eyre!("task disappeared from the store"))?;

    if stored.status() != TaskStatus::Confirmed {
        return Err(eyre::eyre!(
            "expected status confirmed, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("the task is completed")]
fn task_is_completed(world: &CourierWorkflowWorld) -> Result<(), eyre::Report> {
    let task = current_task(world)?;
    if task.status() != TaskStatus::Completed {
        return Err(eyre::eyre!(
            "expected status completed, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("a receipt photo is on record")]
fn receipt_photo_is_on_record(world: &CourierWorkflowWorld) -> Result<(), eyre::Report> {
    let task = current_task(world)?;
    if task.receipt_photo_url().is_none() {
        return Err(eyre::eyre!("expected a recorded receipt photo location"));
    }
    Ok(())
}

#[then("no receipt photo is on record")]
fn no_receipt_photo_is_on_record(world: &CourierWorkflowWorld) -> Result<(), eyre::Report> {
    let task = current_task(world)?;
    if let Some(url) = task.receipt_photo_url() {
        return Err(eyre::eyre!("expected no receipt photo, found {url}"));
    }
    Ok(())
}
