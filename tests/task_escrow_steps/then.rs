//! Then steps for task escrow lifecycle BDD scenarios.

use super::world::{EscrowWorld, run_async};
use piazza::marketplace::{
    domain::{EscrowStatus, Money, TaskStatus},
    services::MarketplaceError,
};
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &EscrowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;

    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task"))?
        .id();
    let persisted = run_async(world.queries.get_task(task_id))?;

    if persisted.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            persisted.status().as_str()
        ));
    }
    Ok(())
}

#[then("the escrow holds {amount:u64} with commission {commission:u64} and tasker payment {payment:u64}")]
fn escrow_holds_split(
    world: &EscrowWorld,
    amount: u64,
    commission: u64,
    payment: u64,
) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task"))?
        .id();
    let persisted = run_async(world.queries.get_task(task_id))?;
    let escrow = persisted
        .escrow()
        .ok_or_else(|| eyre::eyre!("no escrow record on task"))?;

    if escrow.status() != EscrowStatus::Held {
        return Err(eyre::eyre!("escrow is {}, expected held", escrow.status()));
    }
    let expected_amount = Money::new(amount)?;
    let expected_commission = Money::new(commission)?;
    let expected_payment = Money::new(payment)?;
    if escrow.amount() != expected_amount
        || escrow.commission() != expected_commission
        || escrow.tasker_payment() != expected_payment
    {
        return Err(eyre::eyre!(
            "expected split {expected_amount}/{expected_commission}/{expected_payment}, found {}/{}/{}",
            escrow.amount(),
            escrow.commission(),
            escrow.tasker_payment()
        ));
    }
    Ok(())
}

#[then("the payment has been released")]
fn payment_released(world: &EscrowWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task"))?
        .id();
    let persisted = run_async(world.queries.get_task(task_id))?;

    if !persisted.payment_released() {
        return Err(eyre::eyre!("payment has not been released"));
    }
    let escrow = persisted
        .escrow()
        .ok_or_else(|| eyre::eyre!("no escrow record on task"))?;
    if escrow.status() != EscrowStatus::Released {
        return Err(eyre::eyre!("escrow is {}, expected released", escrow.status()));
    }
    Ok(())
}

#[then("the operation fails with a precondition error")]
fn operation_fails_with_precondition(world: &EscrowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;

    if !matches!(result, Err(MarketplaceError::Precondition(_))) {
        return Err(eyre::eyre!("expected precondition error, got {result:?}"));
    }
    Ok(())
}

#[then("the accepted bid is rejected in the ledger")]
fn accepted_bid_rejected(world: &EscrowWorld) -> Result<(), eyre::Report> {
    let bid_id = world
        .accepted_bid
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing accepted bid"))?
        .id();
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task"))?
        .id();

    let ledger = run_async(world.queries.bids_for_task(task_id))?;
    let entry = ledger
        .iter()
        .find(|candidate| candidate.id() == bid_id)
        .ok_or_else(|| eyre::eyre!("bid missing from ledger"))?;

    if entry.acceptance().is_accepted() {
        return Err(eyre::eyre!("bid is still marked accepted"));
    }

    let persisted = run_async(world.queries.get_task(task_id))?;
    if persisted.accepted_bid_id().is_some() {
        return Err(eyre::eyre!("task still points at an accepted bid"));
    }
    Ok(())
}
