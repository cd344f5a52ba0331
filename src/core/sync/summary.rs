//! Sync run summary and reporting

use super::machine::DoneReason;
use crate::adapters::traits::StoredObject;
use crate::domain::ids::Cursor;
use crate::domain::report::Series;
use std::time::Duration;

/// Summary of a successful sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Series that was synced
    pub series: Series,

    /// Cursor the run started from
    pub seed: Cursor,

    /// Cursor the checkpoint holds after the run, or would hold on a dry run
    pub final_cursor: Cursor,

    /// Number of reports stored
    pub delivered: usize,

    /// Receipts of the stored reports, in delivery order
    pub stored: Vec<StoredObject>,

    /// Total bytes stored
    pub bytes: usize,

    /// Why fetching stopped
    pub outcome: DoneReason,

    /// Whether a checkpoint was written; always false on a dry run
    pub committed: bool,

    /// Writes were skipped by the sink and checkpoint store
    pub dry_run: bool,

    /// Duration of the run
    pub duration: Duration,
}

impl SyncSummary {
    /// Create a summary for a run that has not stored anything yet
    pub fn new(series: Series, seed: Cursor) -> Self {
        Self {
            series,
            final_cursor: seed.clone(),
            seed,
            delivered: 0,
            stored: Vec::new(),
            bytes: 0,
            outcome: DoneReason::Exhausted,
            committed: false,
            dry_run: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Record a stored report
    pub fn record(&mut self, object: StoredObject) {
        self.delivered += 1;
        self.bytes += object.bytes;
        self.stored.push(object);
    }

    /// Checkpoint movement for operator output
    pub fn checkpoint_status(&self) -> String {
        if self.committed {
            format!("advanced to {}", self.final_cursor)
        } else if self.dry_run && self.final_cursor != self.seed {
            format!("would advance to {} (dry run)", self.final_cursor)
        } else {
            format!("unchanged at {}", self.final_cursor)
        }
    }

    /// True if the run stored nothing
    pub fn is_noop(&self) -> bool {
        self.delivered == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            series = %self.series,
            seed = %self.seed,
            cursor = %self.final_cursor,
            delivered = self.delivered,
            bytes = self.bytes,
            outcome = %self.outcome,
            committed = self.committed,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Sync completed"
        );

        if self.is_noop() {
            tracing::info!(
                series = %self.series,
                outcome = %self.outcome,
                "No new reports available"
            );
        }
    }
}
