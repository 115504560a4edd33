//! History store implementations for chatrelay.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use chatrelay_config::HistoryConfig;
use chatrelay_core::{HistoryError, HistoryStore};
use std::sync::Arc;
use tracing::info;

/// Build the configured history store.
///
/// Unknown backend names fall back to sqlite, which is also the default.
pub async fn build_from_config(
    config: &HistoryConfig,
) -> Result<Arc<dyn HistoryStore>, HistoryError> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory history store (no persistence)");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "sqlite")]
        _ => {
            if let Some(parent) = std::path::Path::new(&config.path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| HistoryError::Storage(format!("Create data dir: {e}")))?;
            }
            Ok(Arc::new(SqliteStore::new(&config.path).await?))
        }
        #[cfg(not(feature = "sqlite"))]
        other => Err(HistoryError::Storage(format!(
            "Unknown history backend: {other}"
        ))),
    }
}
