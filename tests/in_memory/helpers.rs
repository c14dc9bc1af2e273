//! Shared test helpers for in-memory marketplace integration tests.

use mockable::DefaultClock;
use piazza::marketplace::{
    adapters::memory::{InMemoryBidRepository, InMemoryTaskRepository, RecordingNotificationSink},
    domain::{BudgetType, TaskId, UserId},
    services::{CreateTaskRequest, MarketplaceQueries, MarketplaceService, SubmitBidRequest},
};
use rstest::fixture;
use std::sync::Arc;

/// Fully wired in-memory marketplace for one test.
pub struct TestContext {
    pub service: MarketplaceService<
        InMemoryTaskRepository,
        InMemoryBidRepository,
        RecordingNotificationSink,
        DefaultClock,
    >,
    pub queries: MarketplaceQueries<InMemoryTaskRepository, InMemoryBidRepository>,
    pub sink: Arc<RecordingNotificationSink>,
}

/// Provides a fresh marketplace wiring for each test.
#[fixture]
pub fn context() -> TestContext {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let bids = Arc::new(InMemoryBidRepository::new());
    let sink = Arc::new(RecordingNotificationSink::new());
    let service = MarketplaceService::new(
        Arc::clone(&tasks),
        Arc::clone(&bids),
        Arc::clone(&sink),
        Arc::new(DefaultClock),
    );
    let queries = MarketplaceQueries::new(tasks, bids);
    TestContext {
        service,
        queries,
        sink,
    }
}

/// The customer identity used across scenarios.
pub fn customer() -> UserId {
    UserId::new("customer-1").expect("valid customer id")
}

/// A tasker identity.
pub fn tasker(suffix: u32) -> UserId {
    UserId::new(format!("tasker-{suffix}")).expect("valid tasker id")
}

/// A posting request for a fixed-price cleaning task with a budget of 200
/// minor units.
pub fn cleaning_task_request() -> CreateTaskRequest {
    CreateTaskRequest::new(
        customer().as_str(),
        "Deep-clean a two-bedroom flat",
        "Kitchen and bathroom included, products provided",
        "cleaning",
        200,
        BudgetType::Fixed,
    )
    .with_skills(vec!["cleaning".to_owned()])
    .with_location("Riverside Court 5")
    .with_time_estimate("3 hours")
}

/// A bid request from the numbered tasker.
pub fn bid(task_id: TaskId, tasker_suffix: u32, amount_minor: u64) -> SubmitBidRequest {
    SubmitBidRequest::new(
        task_id,
        tasker(tasker_suffix).as_str(),
        format!("Tasker {tasker_suffix}"),
        amount_minor,
        "I can take care of this",
        "tomorrow afternoon",
    )
    .with_rating_centi(470)
    .with_completed_tasks(5)
}
