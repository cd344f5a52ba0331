//! Job-document checkpoint store
//!
//! Each series has one JSON document shaped like a scheduler job: the
//! checkpoint payload lives base64-encoded in its opaque `data` field.
//!
//! ```json
//! {
//!   "name": "daily-clearing",
//!   "series": "275_2020-01-01",
//!   "data": "eyJwcmV2aW91c1JlcG9ydElkIjoiQiJ9",
//!   "updated_at": "2026-10-16T06:00:00Z"
//! }
//! ```

use crate::adapters::atomic::write_atomic;
use crate::adapters::sink::directory::sanitize_object_name;
use crate::adapters::traits::CheckpointStore;
use crate::core::state::CheckpointPayload;
use crate::domain::errors::SyncError;
use crate::domain::ids::Cursor;
use crate::domain::report::Series;
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted job document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDocument {
    /// Job name
    pub name: String,

    /// Series key the job syncs
    pub series: String,

    /// Base64 JSON checkpoint payload
    #[serde(default)]
    pub data: String,

    /// Last time the document was written
    pub updated_at: DateTime<Utc>,
}

impl JobDocument {
    /// Decoded checkpoint payload
    pub fn payload(&self) -> Result<CheckpointPayload> {
        if self.data.trim().is_empty() {
            return Ok(CheckpointPayload::default());
        }
        CheckpointPayload::from_base64(&self.data)
    }
}

/// Checkpoint store keeping one job document per series in a directory
#[derive(Debug, Clone)]
pub struct JobFileCheckpointStore {
    directory: PathBuf,
    job_name: String,
    dry_run: bool,
}

impl JobFileCheckpointStore {
    /// Create a store rooted at `directory`
    pub fn new(directory: impl Into<PathBuf>, job_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            job_name: job_name.into(),
            dry_run: false,
        }
    }

    /// Log instead of writing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Path of the job document for `series`
    pub fn document_path(&self, series: &Series) -> PathBuf {
        self.directory
            .join(format!("{}.json", sanitize_object_name(&series.key())))
    }

    /// Read the job document for `series`, if one exists
    pub async fn document(&self, series: &Series) -> Result<Option<JobDocument>> {
        let path = self.document_path(series);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document = serde_json::from_slice(&bytes).map_err(|e| {
                    SyncError::Checkpoint(format!(
                        "Corrupt job document {}: {e}",
                        path.display()
                    ))
                })?;
                Ok(Some(document))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::Checkpoint(format!(
                "Failed to read job document {}: {e}",
                path.display()
            ))),
        }
    }

    async fn persist(&self, path: &Path, document: &JobDocument) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await.map_err(|e| {
            SyncError::Checkpoint(format!(
                "Failed to create checkpoint directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let json = serde_json::to_vec_pretty(document)?;
        write_atomic(path, &json).await.map_err(|e| {
            SyncError::Checkpoint(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl CheckpointStore for JobFileCheckpointStore {
    async fn read(&self, series: &Series) -> Result<Cursor> {
        match self.document(series).await? {
            Some(document) => Ok(document.payload()?.cursor()),
            None => {
                tracing::info!(series = %series, "No checkpoint found (first run)");
                Ok(Cursor::start())
            }
        }
    }

    async fn write(&self, series: &Series, cursor: &Cursor) -> Result<()> {
        let path = self.document_path(series);
        let data = CheckpointPayload::from_cursor(cursor).to_base64()?;

        if self.dry_run {
            tracing::info!(
                series = %series,
                cursor = %cursor,
                path = %path.display(),
                "DRY RUN: Would write checkpoint"
            );
            return Ok(());
        }

        let document = match self.document(series).await? {
            Some(mut existing) => {
                existing.data = data;
                existing.updated_at = Utc::now();
                existing
            }
            None => JobDocument {
                name: self.job_name.clone(),
                series: series.key(),
                data,
                updated_at: Utc::now(),
            },
        };

        self.persist(&path, &document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::TemplateId;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn series(template: &str) -> Series {
        Series::new(
            TemplateId::new(template).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_read_missing_document_is_start() {
        let dir = TempDir::new().unwrap();
        let store = JobFileCheckpointStore::new(dir.path(), "daily-clearing");
        assert!(store.read(&series("275")).await.unwrap().is_start());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = JobFileCheckpointStore::new(dir.path().join("state"), "daily-clearing");

        store
            .write(&series("275"), &Cursor::from_stored("B"))
            .await
            .unwrap();

        assert_eq!(store.read(&series("275")).await.unwrap().as_str(), "B");
        assert!(store.read(&series("276")).await.unwrap().is_start());

        let document = store.document(&series("275")).await.unwrap().unwrap();
        assert_eq!(document.name, "daily-clearing");
        assert_eq!(document.series, "275_2020-01-01");
        assert_eq!(document.payload().unwrap().previous_report_id, "B");
    }

    #[tokio::test]
    async fn test_write_keeps_existing_job_name() {
        let dir = TempDir::new().unwrap();
        JobFileCheckpointStore::new(dir.path(), "first-job")
            .write(&series("275"), &Cursor::from_stored("A"))
            .await
            .unwrap();

        let store = JobFileCheckpointStore::new(dir.path(), "second-job");
        store
            .write(&series("275"), &Cursor::from_stored("C"))
            .await
            .unwrap();

        let document = store.document(&series("275")).await.unwrap().unwrap();
        assert_eq!(document.name, "first-job");
        assert_eq!(document.payload().unwrap().cursor().as_str(), "C");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_error() {
        let dir = TempDir::new().unwrap();
        let store = JobFileCheckpointStore::new(dir.path(), "daily-clearing");
        std::fs::write(store.document_path(&series("275")), b"{ not json").unwrap();

        assert!(matches!(
            store.read(&series("275")).await,
            Err(SyncError::Checkpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_dry_run_skips_write() {
        let dir = TempDir::new().unwrap();
        let store = JobFileCheckpointStore::new(dir.path(), "daily-clearing").with_dry_run(true);

        store
            .write(&series("275"), &Cursor::from_stored("B"))
            .await
            .unwrap();

        assert!(!store.document_path(&series("275")).exists());
    }
}
