//! Collaborator traits consumed by the sync loop
//!
//! The loop only sees these three seams. Production implementations live in
//! the sibling modules; tests substitute in-memory fakes.

use crate::domain::ids::Cursor;
use crate::domain::report::{FetchOutcome, Report, Series};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of the next report in a series
///
/// `fetch` is a pure query: the same `(series, cursor)` pair is always safe
/// to re-issue. Implementations never retry and never write anywhere.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch the report following `cursor` in `series`
    ///
    /// Every failure, including transport errors, is reported as
    /// [`FetchOutcome::Failed`].
    async fn fetch(&self, series: &Series, cursor: &Cursor) -> FetchOutcome;

    /// Human readable location of the source for logs
    fn describe(&self) -> String;
}

/// Durable destination for fetched reports
///
/// Writes are keyed by [`Report::object_name`] and overwrite, so the same
/// report may be stored twice without error.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist one report
    ///
    /// # Errors
    ///
    /// Returns an error if the report could not be made durable. The report
    /// may or may not have been written in that case.
    async fn store(&self, report: &Report) -> Result<StoredObject>;
}

/// Durable record of the last committed cursor per series
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the committed cursor; a missing record yields [`Cursor::start`]
    async fn read(&self, series: &Series) -> Result<Cursor>;

    /// Replace the committed cursor
    ///
    /// This is the single commit point of a run.
    async fn write(&self, series: &Series, cursor: &Cursor) -> Result<()>;
}

/// Receipt for a stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object name inside the sink
    pub name: String,

    /// Content type the object was tagged with
    pub content_type: String,

    /// Stored size in bytes
    pub bytes: usize,

    /// When the object was written
    pub stored_at: DateTime<Utc>,
}

impl StoredObject {
    /// Receipt for `report` stored now
    pub fn for_report(report: &Report) -> Self {
        Self {
            name: report.object_name(),
            content_type: report.content_type.clone(),
            bytes: report.size(),
            stored_at: Utc::now(),
        }
    }
}
