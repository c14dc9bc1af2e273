//! Given steps for task escrow lifecycle BDD scenarios.

use super::world::{EscrowWorld, run_async};
use eyre::WrapErr;
use piazza::marketplace::{
    domain::{BudgetType, Party, UserId},
    services::{CreateTaskRequest, SubmitBidRequest},
};
use rstest_bdd_macros::given;

#[given("a posted task with a budget of {budget:u64}")]
fn posted_task(world: &mut EscrowWorld, budget: u64) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(
        world.customer.as_str(),
        "Deep-clean a two-bedroom flat",
        "Kitchen and bathroom included",
        "cleaning",
        budget,
        BudgetType::Fixed,
    );
    let created =
        run_async(world.service.create_task(request)).wrap_err("post task in scenario setup")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"a bid of {amount:u64} from "{bidder_id}""#)]
fn submitted_bid(
    world: &mut EscrowWorld,
    amount: u64,
    bidder_id: String,
) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?;

    let request = SubmitBidRequest::new(
        task.id(),
        bidder_id.as_str(),
        "Scenario Tasker",
        amount,
        "I can take care of this",
        "tomorrow afternoon",
    );
    let submitted =
        run_async(world.service.submit_bid(request)).wrap_err("submit bid in scenario setup")?;
    world.accepted_bid = Some(submitted);
    Ok(())
}

#[given("the bid has been accepted")]
fn bid_accepted(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?;
    let bid = world
        .accepted_bid
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing submitted bid in scenario world"))?;

    let updated = run_async(world.service.accept_bid(task.id(), bid.id()))
        .wrap_err("accept bid in scenario setup")?;
    world.task = Some(updated);
    Ok(())
}

#[given("the customer has approved the task")]
fn customer_approved(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?;

    let updated = run_async(
        world
            .service
            .approve_and_hold_escrow(task.id(), &world.customer),
    )
    .wrap_err("approve escrow in scenario setup")?;
    world.task = Some(updated);
    Ok(())
}

#[given("the tasker has confirmed completion")]
fn tasker_confirmed(world: &mut EscrowWorld) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))?;
    let bid = world
        .accepted_bid
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing accepted bid in scenario world"))?;
    let tasker_id: UserId = bid.bidder().id().clone();

    let updated = run_async(
        world
            .service
            .mark_completed(task.id(), &tasker_id, Party::Tasker),
    )
    .wrap_err("record tasker completion in scenario setup")?;
    world.task = Some(updated);
    Ok(())
}
