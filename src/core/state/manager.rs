//! Checkpoint manager
//!
//! Owns the single commit point of a sync run. Store errors on commit are
//! turned into [`FailureKind::Persistence`] so the caller can flag the
//! duplicate-delivery risk.

use crate::adapters::traits::CheckpointStore;
use crate::domain::errors::{Failure, FailureKind};
use crate::domain::ids::Cursor;
use crate::domain::report::Series;
use crate::domain::Result;
use std::sync::Arc;

/// Loads and commits cursors through a [`CheckpointStore`]
#[derive(Clone)]
pub struct CheckpointManager {
    store: Arc<dyn CheckpointStore>,
}

impl CheckpointManager {
    /// Create a manager over `store`
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self { store }
    }

    /// Load the committed cursor for `series`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A missing record is not
    /// an error and yields [`Cursor::start`].
    pub async fn load(&self, series: &Series) -> Result<Cursor> {
        let cursor = self.store.read(series).await?;
        tracing::debug!(series = %series, cursor = %cursor, "Loaded checkpoint");
        Ok(cursor)
    }

    /// Commit `cursor` as the new resume position of `series`
    pub async fn commit(
        &self,
        series: &Series,
        cursor: &Cursor,
    ) -> std::result::Result<(), Failure> {
        tracing::info!(series = %series, cursor = %cursor, "Committing checkpoint");

        self.store.write(series, cursor).await.map_err(|e| {
            Failure::new(
                FailureKind::Persistence,
                format!("Failed to write checkpoint {cursor} for {series}: {e}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SyncError;
    use crate::domain::ids::TemplateId;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        cursor: Mutex<Option<Cursor>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl CheckpointStore for MemoryStore {
        async fn read(&self, _series: &Series) -> Result<Cursor> {
            Ok(self.cursor.lock().unwrap().clone().unwrap_or_default())
        }

        async fn write(&self, _series: &Series, cursor: &Cursor) -> Result<()> {
            if self.fail_writes {
                return Err(SyncError::Checkpoint("disk full".to_string()));
            }
            *self.cursor.lock().unwrap() = Some(cursor.clone());
            Ok(())
        }
    }

    fn series() -> Series {
        Series::new(
            TemplateId::new("275").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_load_missing_is_start() {
        let manager = CheckpointManager::new(Arc::new(MemoryStore::default()));
        assert!(manager.load(&series()).await.unwrap().is_start());
    }

    #[tokio::test]
    async fn test_commit_then_load() {
        let manager = CheckpointManager::new(Arc::new(MemoryStore::default()));
        manager
            .commit(&series(), &Cursor::from_stored("C"))
            .await
            .unwrap();
        assert_eq!(manager.load(&series()).await.unwrap().as_str(), "C");
    }

    #[tokio::test]
    async fn test_commit_failure_is_persistence() {
        let store = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        let manager = CheckpointManager::new(Arc::new(store));
        let failure = manager
            .commit(&series(), &Cursor::from_stored("C"))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Persistence);
        assert!(failure.message.contains("disk full"));
    }
}
