//! End-to-end lifecycle scenarios from posting through payment release.

use crate::in_memory::helpers::{TestContext, bid, cleaning_task_request, context, customer, tasker};
use piazza::marketplace::{
    domain::{EscrowStatus, MarketplaceEvent, Money, Party, TaskStatus},
    services::MarketplaceError,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_reaches_payment_release(context: TestContext) {
    let task = context
        .service
        .create_task(cleaning_task_request())
        .await
        .expect("task creation");
    let low_bid = context
        .service
        .submit_bid(bid(task.id(), 1, 80))
        .await
        .expect("first bid");
    let high_bid = context
        .service
        .submit_bid(bid(task.id(), 2, 95))
        .await
        .expect("second bid");

    let accepted = context
        .service
        .accept_bid(task.id(), high_bid.id())
        .await
        .expect("bid acceptance");
    assert_eq!(accepted.status(), TaskStatus::BidAccepted);
    assert_eq!(accepted.bids_count(), 2);

    let approved = context
        .service
        .approve_and_hold_escrow(task.id(), &customer())
        .await
        .expect("escrow approval");
    let escrow = approved.escrow().expect("escrow record");
    assert_eq!(escrow.status(), EscrowStatus::Held);
    assert_eq!(escrow.amount(), Money::new(200).expect("amount"));
    assert_eq!(escrow.commission(), Money::new(20).expect("commission"));
    assert_eq!(escrow.tasker_payment(), Money::new(180).expect("payment"));

    let in_progress = context
        .service
        .mark_completed(task.id(), &tasker(2), Party::Tasker)
        .await
        .expect("tasker confirmation");
    assert_eq!(in_progress.status(), TaskStatus::InProgress);

    let completed = context
        .service
        .mark_completed(task.id(), &customer(), Party::Customer)
        .await
        .expect("customer confirmation");
    assert_eq!(completed.status(), TaskStatus::Completed);
    assert!(completed.completed_at().is_some());

    let paid = context
        .service
        .release_payment(task.id(), &customer())
        .await
        .expect("payment release");
    assert!(paid.payment_released());
    assert_eq!(
        paid.escrow().expect("escrow record").status(),
        EscrowStatus::Released
    );

    let events = context.sink.recorded().await;
    assert_eq!(events.len(), 8, "one event per committed transition");
    assert_eq!(
        events.first(),
        Some(&MarketplaceEvent::TaskCreated {
            task_id: task.id(),
            customer_id: customer(),
        })
    );
    assert!(events.contains(&MarketplaceEvent::BidSubmitted {
        task_id: task.id(),
        bid_id: low_bid.id(),
        bidder_id: tasker(1),
    }));
    assert_eq!(
        events.last(),
        Some(&MarketplaceEvent::PaymentReleased {
            task_id: task.id(),
            tasker_payment: Money::new(180).expect("payment"),
        })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn release_before_both_confirmations_is_rejected(context: TestContext) {
    let task = context
        .service
        .create_task(cleaning_task_request())
        .await
        .expect("task creation");
    let offer = context
        .service
        .submit_bid(bid(task.id(), 1, 95))
        .await
        .expect("bid");
    context
        .service
        .accept_bid(task.id(), offer.id())
        .await
        .expect("acceptance");
    context
        .service
        .approve_and_hold_escrow(task.id(), &customer())
        .await
        .expect("approval");
    context
        .service
        .mark_completed(task.id(), &tasker(1), Party::Tasker)
        .await
        .expect("tasker confirmation");

    let result = context.service.release_payment(task.id(), &customer()).await;

    assert!(matches!(result, Err(MarketplaceError::Precondition(_))));
    let refreshed = context.queries.get_task(task.id()).await.expect("lookup");
    assert!(!refreshed.payment_released());
    assert_eq!(
        refreshed.escrow().expect("escrow record").status(),
        EscrowStatus::Held
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_after_escrow_approval_is_rejected(context: TestContext) {
    let task = context
        .service
        .create_task(cleaning_task_request())
        .await
        .expect("task creation");
    let offer = context
        .service
        .submit_bid(bid(task.id(), 1, 95))
        .await
        .expect("bid");
    context
        .service
        .accept_bid(task.id(), offer.id())
        .await
        .expect("acceptance");
    context
        .service
        .approve_and_hold_escrow(task.id(), &customer())
        .await
        .expect("approval");

    let result = context.service.cancel(task.id(), &customer()).await;

    assert!(matches!(result, Err(MarketplaceError::Precondition(_))));
    let refreshed = context.queries.get_task(task.id()).await.expect("lookup");
    assert_eq!(refreshed.status(), TaskStatus::Approved);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_acceptance_on_the_same_task_is_rejected(context: TestContext) {
    let task = context
        .service
        .create_task(cleaning_task_request())
        .await
        .expect("task creation");
    let first = context
        .service
        .submit_bid(bid(task.id(), 1, 80))
        .await
        .expect("first bid");
    let second = context
        .service
        .submit_bid(bid(task.id(), 2, 95))
        .await
        .expect("second bid");
    context
        .service
        .accept_bid(task.id(), first.id())
        .await
        .expect("first acceptance");

    let result = context.service.accept_bid(task.id(), second.id()).await;

    assert!(matches!(result, Err(MarketplaceError::Precondition(_))));
    let refreshed = context.queries.get_task(task.id()).await.expect("lookup");
    assert_eq!(refreshed.accepted_bid_id(), Some(first.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_by_stranger_is_rejected(context: TestContext) {
    let task = context
        .service
        .create_task(cleaning_task_request())
        .await
        .expect("task creation");
    let offer = context
        .service
        .submit_bid(bid(task.id(), 1, 95))
        .await
        .expect("bid");
    context
        .service
        .accept_bid(task.id(), offer.id())
        .await
        .expect("acceptance");

    let result = context
        .service
        .approve_and_hold_escrow(task.id(), &tasker(1))
        .await;

    assert!(matches!(result, Err(MarketplaceError::Precondition(_))));
    let refreshed = context.queries.get_task(task.id()).await.expect("lookup");
    assert!(refreshed.escrow().is_none());
}
