//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chatrelay_core::error::HistoryError;
use chatrelay_core::history::HistoryStore;
use chatrelay_core::turn::{ChatTurn, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An in-memory store that keeps each partition as a timestamp-sorted Vec.
/// Useful for testing and sessions where persistence isn't needed.
#[derive(Default)]
pub struct InMemoryStore {
    partitions: RwLock<HashMap<String, Vec<ChatTurn>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, HistoryError> {
        let partitions = self.partitions.read().await;
        let Some(turns) = partitions.get(user_id.as_str()) else {
            return Ok(Vec::new());
        };
        let start = turns.len().saturating_sub(limit);
        Ok(turns[start..].to_vec())
    }

    async fn append(&self, turn: ChatTurn) -> Result<(), HistoryError> {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(turn.user_id.0.clone()).or_default();
        partition.push(turn);
        // keep the partition totally ordered by timestamp
        partition.sort_by_key(|t| t.timestamp);
        Ok(())
    }

    async fn count(&self, user_id: &UserId) -> Result<usize, HistoryError> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(user_id.as_str()).map_or(0, Vec::len))
    }
}
