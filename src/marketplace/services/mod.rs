//! Application services orchestrating the marketplace lifecycle.

mod lifecycle;
mod queries;

pub use lifecycle::{
    CreateTaskRequest, MarketplaceError, MarketplaceResult, MarketplaceService, SubmitBidRequest,
};
pub use queries::MarketplaceQueries;
