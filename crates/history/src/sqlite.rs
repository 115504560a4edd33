//! SQLite store — the persistent, partitioned, sort-key-ordered backend.
//!
//! One table, `turns`, keyed by `(user_id, timestamp)`. The recent-window
//! query is a reverse-chronological range scan with a result limit,
//! reversed in memory so callers receive chronological order.

use async_trait::async_trait;
use chatrelay_core::error::HistoryError;
use chatrelay_core::history::HistoryStore;
use chatrelay_core::turn::{ChatTurn, Role, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed history store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn new(path: &str) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| HistoryError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite history store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, HistoryError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), HistoryError> {
        // Composite primary key: partition + sort key. Appends only — the
        // absence of an upsert clause is deliberate.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                user_id    TEXT NOT NULL,
                timestamp  INTEGER NOT NULL,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                PRIMARY KEY (user_id, timestamp)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::MigrationFailed(format!("turns table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<ChatTurn, HistoryError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| HistoryError::QueryFailed(format!("user_id column: {e}")))?;
        let timestamp: i64 = row
            .try_get("timestamp")
            .map_err(|e| HistoryError::QueryFailed(format!("timestamp column: {e}")))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| HistoryError::QueryFailed(format!("role column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| HistoryError::QueryFailed(format!("content column: {e}")))?;

        let role = Role::from_str(&role_str)
            .map_err(|e| HistoryError::QueryFailed(format!("role column: {e}")))?;

        Ok(ChatTurn {
            user_id: UserId::new(user_id),
            timestamp,
            role,
            content,
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, HistoryError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, timestamp, role, content
            FROM turns
            WHERE user_id = ?1
            ORDER BY timestamp DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::QueryFailed(format!("Recent window: {e}")))?;

        let mut turns: Vec<ChatTurn> = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<Result<_, _>>()?;

        // newest-to-oldest from the index scan; callers want chronological
        turns.reverse();
        Ok(turns)
    }

    async fn append(&self, turn: ChatTurn) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            INSERT INTO turns (user_id, timestamp, role, content)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(turn.user_id.as_str())
        .bind(turn.timestamp)
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Storage(format!("INSERT failed: {e}")))?;

        debug!(user = %turn.user_id, timestamp = turn.timestamp, "Turn appended");
        Ok(())
    }

    async fn count(&self, user_id: &UserId) -> Result<usize, HistoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM turns WHERE user_id = ?1")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HistoryError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| HistoryError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}
