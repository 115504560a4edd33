//! History store trait — ordered chat turns keyed by user identity.
//!
//! The store is a partitioned, sort-key-ordered collection: every turn is
//! keyed by `(user_id, timestamp)` and only ever appended. An empty
//! partition is not an error — a user simply has no history yet.
//!
//! Implementations: SQLite, in-memory (for testing).

use crate::error::HistoryError;
use crate::turn::{ChatTurn, UserId};
use async_trait::async_trait;

/// The core HistoryStore trait.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// The most recent `limit` turns in a partition, oldest-first.
    ///
    /// Returns an empty Vec when the partition has no entries.
    async fn recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> std::result::Result<Vec<ChatTurn>, HistoryError>;

    /// Write one immutable turn. The caller assigns the timestamp at write
    /// time (see [`crate::clock::TurnClock`]); no update or delete exists.
    async fn append(&self, turn: ChatTurn) -> std::result::Result<(), HistoryError>;

    /// Total turn count in a partition. Used by diagnostics and tests.
    async fn count(&self, user_id: &UserId) -> std::result::Result<usize, HistoryError>;
}
