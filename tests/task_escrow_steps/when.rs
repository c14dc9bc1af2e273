//! When steps for task escrow lifecycle BDD scenarios.

use super::world::{EscrowWorld, run_async};
use piazza::marketplace::{
    domain::{Party, Task, UserId},
    services::MarketplaceError,
};
use rstest_bdd_macros::when;

fn record_outcome(world: &mut EscrowWorld, result: Result<Task, MarketplaceError>) {
    if let Ok(ref updated) = result {
        world.task = Some(updated.clone());
    }
    world.last_result = Some(result);
}

#[when("the customer approves the task")]
fn customer_approves(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?
        .id();

    let customer = world.customer.clone();
    let result = run_async(world.service.approve_and_hold_escrow(task_id, &customer));
    record_outcome(world, result);
    Ok(())
}

#[when("the customer confirms completion")]
fn customer_confirms(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?
        .id();

    let customer = world.customer.clone();
    let result = run_async(
        world
            .service
            .mark_completed(task_id, &customer, Party::Customer),
    );
    record_outcome(world, result);
    Ok(())
}

#[when("the customer releases the payment")]
fn customer_releases(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?
        .id();

    let customer = world.customer.clone();
    let result = run_async(world.service.release_payment(task_id, &customer));
    record_outcome(world, result);
    Ok(())
}

#[when("the customer cancels the task")]
fn customer_cancels(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?
        .id();

    let customer = world.customer.clone();
    let result = run_async(world.service.cancel(task_id, &customer));
    record_outcome(world, result);
    Ok(())
}

#[when(r#""{user_id}" confirms completion as the tasker"#)]
fn stranger_confirms(world: &mut EscrowWorld, user_id: String) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?
        .id();
    let actor = UserId::new(user_id).map_err(|err| eyre::eyre!("invalid actor id: {err}"))?;

    let result = run_async(world.service.mark_completed(task_id, &actor, Party::Tasker));
    record_outcome(world, result);
    Ok(())
}
