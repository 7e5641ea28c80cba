//! Leaderboard computation
//!
//! The leaderboard is recomputed from the raw sale records on every call:
//! [`aggregator::aggregate`] folds records into per-agent totals and
//! [`ranker::rank`] orders them and assigns dense tie ranks.

pub mod aggregator;
pub mod ranker;

pub use aggregator::{AgentAggregate, AggregateError, aggregate};
pub use ranker::{RankedEntry, rank};

use crate::database::{DatabaseError, DatabaseManager};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error(transparent)]
    Storage(#[from] DatabaseError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Builds the ranked leaderboard from the current store contents
pub struct LeaderboardService {
    database: Arc<dyn DatabaseManager>,
}

impl LeaderboardService {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    /// Aggregate and rank every stored sale. Read-only.
    pub async fn get_leaderboard(&self) -> Result<Vec<RankedEntry>, LeaderboardError> {
        let records = self.database.sales().list_all().await?;
        let agents = aggregate(&records)?;

        debug!(
            records = records.len(),
            agents = agents.len(),
            "Computing leaderboard"
        );

        Ok(rank(agents.into_values().collect()))
    }
}
