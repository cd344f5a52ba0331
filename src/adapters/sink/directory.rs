//! Filesystem report sink
//!
//! Each report lands in `<directory>/<id>_<filename>`. Writing the same report
//! twice overwrites the object, so re-delivery after a failed commit is
//! harmless.

use crate::adapters::atomic::write_atomic;
use crate::adapters::traits::{ReportSink, StoredObject};
use crate::domain::errors::SyncError;
use crate::domain::report::Report;
use crate::domain::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Suffix of the metadata sidecar written next to each report
pub const METADATA_SUFFIX: &str = ".meta.json";

/// Sidecar describing a stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub report_id: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: usize,
    pub sha256: String,
    pub stored_at: chrono::DateTime<chrono::Utc>,
}

/// Sink writing reports into a local directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
    write_metadata: bool,
    dry_run: bool,
}

impl DirectorySink {
    /// Create a sink rooted at `directory`
    pub fn new(directory: impl Into<PathBuf>, write_metadata: bool) -> Self {
        Self {
            directory: directory.into(),
            write_metadata,
            dry_run: false,
        }
    }

    /// Log instead of writing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Root directory of the sink
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path a report is stored under
    pub fn object_path(&self, report: &Report) -> PathBuf {
        self.directory.join(sanitize_object_name(&report.object_name()))
    }

    async fn write_sidecar(
        &self,
        path: &Path,
        report: &Report,
        stored: &StoredObject,
    ) -> Result<()> {
        let metadata = ObjectMetadata {
            report_id: report.id.to_string(),
            filename: report.filename.clone(),
            content_type: report.content_type.clone(),
            bytes: report.size(),
            sha256: sha256_hex(&report.content),
            stored_at: stored.stored_at,
        };
        let json = serde_json::to_vec_pretty(&metadata)?;

        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(METADATA_SUFFIX);
        write_atomic(Path::new(&sidecar), &json).await
    }
}

#[async_trait]
impl ReportSink for DirectorySink {
    async fn store(&self, report: &Report) -> Result<StoredObject> {
        let path = self.object_path(report);
        let mut stored = StoredObject::for_report(report);
        stored.name = sanitize_object_name(&stored.name);

        if self.dry_run {
            tracing::info!(
                report_id = %report.id,
                path = %path.display(),
                bytes = report.size(),
                "DRY RUN: Would store report"
            );
            return Ok(stored);
        }

        tokio::fs::create_dir_all(&self.directory).await.map_err(|e| {
            SyncError::Storage(format!(
                "Failed to create sink directory {}: {e}",
                self.directory.display()
            ))
        })?;

        write_atomic(&path, &report.content).await.map_err(|e| {
            SyncError::Storage(format!("Failed to write {}: {e}", path.display()))
        })?;

        if self.write_metadata {
            self.write_sidecar(&path, report, &stored)
                .await
                .map_err(|e| SyncError::Storage(format!("Failed to write metadata: {e}")))?;
        }

        tracing::debug!(
            report_id = %report.id,
            path = %path.display(),
            bytes = stored.bytes,
            "Report written to sink"
        );

        Ok(stored)
    }
}

/// Replace characters that would escape the sink directory
pub fn sanitize_object_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => format!("_{cleaned}"),
        _ => cleaned,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{result:x}")
}
