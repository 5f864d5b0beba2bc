//! Given steps for courier workflow BDD scenarios.

use super::world::{CourierWorkflowWorld, run_async};
use eyre::WrapErr;
use reparto::dispatch::{
    domain::{Task, TaskKind},
    services::CreateTaskRequest,
};
use rstest_bdd_macros::given;

#[given(r#"an open "{kind}" task on the board"#)]
fn open_task_on_board(world: &mut CourierWorkflowWorld, kind: String) -> Result<(), eyre::Report> {
    let task_kind = TaskKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid task kind in scenario: {err}"))?;

    let created = run_async(
        world
            .lifecycle
            .create_task(CreateTaskRequest::new(world.organization_id, task_kind)),
    )
    .wrap_err("create task for workflow scenario")?;
    world.current_task = Some(created);
    Ok(())
}

#[given(r#"courier "{name}" has claimed the task"#)]
fn courier_has_claimed_task(
    world: &mut CourierWorkflowWorld,
    name: String,
) -> Result<(), eyre::Report> {
    let task_id = world
        .current_task
        .as_ref()
        .map(Task::id)
        .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))?;
    let courier = world.courier(&name);

    let claimed = run_async(world.assignment.assign_to_courier(task_id, courier))
        .wrap_err("claim task in scenario setup")?;
    world.current_task = Some(claimed);
    Ok(())
}
