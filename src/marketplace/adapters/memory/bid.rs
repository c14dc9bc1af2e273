//! In-memory bid ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::marketplace::{
    domain::{Bid, BidId, TaskId},
    ports::{BidRepository, RepositoryError, RepositoryResult},
};

/// Thread-safe in-memory bid ledger.
///
/// The per-task index preserves insertion order, which is the ledger's
/// stable submission order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBidRepository {
    state: Arc<RwLock<InMemoryBidState>>,
}

#[derive(Debug, Default)]
struct InMemoryBidState {
    bids: HashMap<BidId, Bid>,
    task_index: HashMap<TaskId, Vec<BidId>>,
}

impl InMemoryBidRepository {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BidRepository for InMemoryBidRepository {
    async fn store(&self, bid: &Bid) -> RepositoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        if state.bids.contains_key(&bid.id()) {
            return Err(RepositoryError::DuplicateBid(bid.id()));
        }

        state
            .task_index
            .entry(bid.task_id())
            .or_default()
            .push(bid.id());
        state.bids.insert(bid.id(), bid.clone());
        Ok(())
    }

    async fn update(&self, bid: &Bid) -> RepositoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        if !state.bids.contains_key(&bid.id()) {
            return Err(RepositoryError::BidNotFound(bid.id()));
        }

        // Amendment only; the index entry keeps its submission position.
        state.bids.insert(bid.id(), bid.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: BidId) -> RepositoryResult<Option<Bid>> {
        let state = self
            .state
            .read()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        Ok(state.bids.get(&id).cloned())
    }

    async fn list_for_task(&self, task_id: TaskId) -> RepositoryResult<Vec<Bid>> {
        let state = self
            .state
            .read()
            .map_err(|err| RepositoryError::storage(std::io::Error::other(err.to_string())))?;
        let bids = state
            .task_index
            .get(&task_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.bids.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(bids)
    }
}
