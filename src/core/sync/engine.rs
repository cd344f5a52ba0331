//! Sync loop engine
//!
//! Drives a [`SyncMachine`] against injected collaborators. Fetches and sink
//! writes are bounded by the run deadline and raced against the shutdown
//! signal; either interruption fails the run as `Cancelled` without writing a
//! checkpoint. The checkpoint commit is bounded by the deadline only.

use super::machine::{SyncEvent, SyncMachine};
use super::summary::SyncSummary;
use crate::adapters::traits::{ReportSink, ReportSource};
use crate::config::SyncLoopConfig;
use crate::core::state::{CheckpointManager, TriggerEvent};
use crate::domain::errors::{Failure, FailureKind};
use crate::domain::ids::Cursor;
use crate::domain::report::{FetchOutcome, Series};
use crate::domain::Result;
use crate::{log_report_stored, log_run_failure};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Per-run limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Deadline applied to the whole run
    pub run_timeout: Duration,

    /// Stop after this many reports; `None` walks to exhaustion
    pub max_reports_per_run: Option<usize>,

    /// Collaborators skip their writes; the summary reports the checkpoint
    /// as not written
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options from the `[sync]` configuration section
    pub fn from_config(config: &SyncLoopConfig) -> Self {
        Self {
            run_timeout: config.run_timeout(),
            max_reports_per_run: config.max_reports_per_run,
            dry_run: false,
        }
    }

    /// Mark the run as a dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&SyncLoopConfig::default())
    }
}

/// Why an awaited step did not finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Deadline(Duration),
    Shutdown,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Deadline(timeout) => {
                write!(f, "run deadline of {}s exceeded", timeout.as_secs())
            }
            Interrupt::Shutdown => f.write_str("shutdown requested"),
        }
    }
}

/// Fetch-and-checkpoint loop for one series
pub struct SyncLoop {
    source: Arc<dyn ReportSource>,
    sink: Arc<dyn ReportSink>,
    checkpoints: CheckpointManager,
    options: SyncOptions,
    shutdown: Option<watch::Receiver<bool>>,
}

impl SyncLoop {
    /// Create a loop over the given collaborators
    pub fn new(
        source: Arc<dyn ReportSource>,
        sink: Arc<dyn ReportSink>,
        checkpoints: CheckpointManager,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            sink,
            checkpoints,
            options,
            shutdown: None,
        }
    }

    /// Cancel in-flight fetches and writes when `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run seeded from the committed checkpoint
    ///
    /// # Errors
    ///
    /// Returns the store error if the checkpoint cannot be read, otherwise
    /// see [`SyncLoop::run`].
    pub async fn run_from_checkpoint(&self, series: &Series) -> Result<SyncSummary> {
        let seed = self.checkpoints.load(series).await?;
        self.run(series, seed).await
    }

    /// Run for an invocation trigger
    ///
    /// The committed checkpoint stays authoritative. A trigger payload that
    /// disagrees with it is logged and ignored, so a stale or hand-edited
    /// trigger can neither skip uncommitted reports nor rewind the series.
    ///
    /// # Errors
    ///
    /// Fails before the first fetch if the payload cannot be decoded or the
    /// checkpoint cannot be read.
    pub async fn run_from_trigger(
        &self,
        series: &Series,
        event: &TriggerEvent,
    ) -> Result<SyncSummary> {
        let requested = event.payload()?.cursor();
        let committed = self.checkpoints.load(series).await?;

        if requested != committed {
            tracing::warn!(
                series = %series,
                trigger_cursor = %requested,
                checkpoint_cursor = %committed,
                "Trigger payload differs from the checkpoint; resuming from the checkpoint"
            );
        }

        self.run(series, committed).await
    }

    /// Run the loop from `seed` until exhaustion, the report limit or a failure
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RunFailed`](crate::domain::SyncError::RunFailed)
    /// carrying the failure kind and the number of reports stored before it.
    /// No checkpoint is written in that case unless the failure is the
    /// commit itself.
    pub async fn run(&self, series: &Series, seed: Cursor) -> Result<SyncSummary> {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.options.run_timeout;
        let mut machine = SyncMachine::new(seed.clone(), self.options.max_reports_per_run);
        let mut summary = SyncSummary::new(series.clone(), seed);

        tracing::info!(
            series = %series,
            cursor = %machine.seed(),
            source = %self.source.describe(),
            "Starting sync run"
        );

        while let Some(cursor) = machine.fetch_cursor().cloned() {
            let fetch_started = Instant::now();

            let outcome = match self.bounded(deadline, self.source.fetch(series, &cursor)).await {
                Ok(outcome) => outcome,
                Err(interrupt) => {
                    machine.apply(SyncEvent::Cancelled(format!(
                        "fetch after {cursor} interrupted: {interrupt}"
                    )));
                    continue;
                }
            };

            tracing::debug!(
                series = %series,
                cursor = %cursor,
                outcome = outcome.label(),
                "Fetch completed"
            );

            let event = match outcome {
                FetchOutcome::Delivered(report) => {
                    if Cursor::after(&report.id) == cursor {
                        machine.apply(SyncEvent::FetchFailed(Failure::new(
                            FailureKind::InvalidResponse,
                            format!(
                                "source returned report {} again for cursor {cursor}",
                                report.id
                            ),
                        )));
                        continue;
                    }

                    let stored = self.bounded(deadline, self.sink.store(&report)).await;
                    match stored {
                        Ok(Ok(stored)) => {
                            log_report_stored!(
                                series,
                                report.id,
                                report.filename,
                                stored.bytes,
                                fetch_started.elapsed()
                            );
                            summary.record(stored);
                            SyncEvent::Stored(report.id)
                        }
                        Ok(Err(e)) => SyncEvent::SinkFailed(format!(
                            "failed to store report {}: {e}",
                            report.id
                        )),
                        Err(interrupt) => SyncEvent::Cancelled(format!(
                            "store of report {} interrupted: {interrupt}",
                            report.id
                        )),
                    }
                }
                FetchOutcome::Exhausted => SyncEvent::Exhausted,
                FetchOutcome::NotReady => SyncEvent::NotReady,
                FetchOutcome::Failed(failure) => SyncEvent::FetchFailed(failure),
            };

            machine.apply(event);
        }

        if let Some(target) = machine.commit_target().cloned() {
            let commit = self.checkpoints.commit(series, &target);
            let event = match tokio::time::timeout_at(deadline, commit).await {
                Ok(Ok(())) => SyncEvent::Committed,
                Ok(Err(failure)) => SyncEvent::CommitFailed(failure.message),
                Err(_) => SyncEvent::CommitFailed(format!(
                    "checkpoint commit of {target} interrupted: {}",
                    Interrupt::Deadline(self.options.run_timeout)
                )),
            };
            machine.apply(event);
        }

        summary.duration = started.elapsed();
        summary.dry_run = self.options.dry_run;
        summary.committed = machine.committed() && !self.options.dry_run;
        summary.final_cursor = machine.resume_cursor().clone();

        match machine.outcome() {
            Some(Ok(reason)) => {
                summary.outcome = reason;
                summary.log_summary();
                Ok(summary)
            }
            Some(Err(failure)) => {
                log_run_failure!(series, failure, machine.delivered());
                Err(failure.clone().into_error(machine.delivered()))
            }
            None => Err(Failure::new(
                FailureKind::Unknown,
                "sync loop stopped before reaching a terminal state",
            )
            .into_error(machine.delivered())),
        }
    }

    /// Await `step` unless the deadline passes or shutdown is requested first
    async fn bounded<F>(
        &self,
        deadline: tokio::time::Instant,
        step: F,
    ) -> std::result::Result<F::Output, Interrupt>
    where
        F: Future,
    {
        let mut shutdown = self.shutdown.clone();

        tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => Err(Interrupt::Shutdown),
            result = tokio::time::timeout_at(deadline, step) => {
                result.map_err(|_| Interrupt::Deadline(self.options.run_timeout))
            }
        }
    }
}

/// Resolves once shutdown is signalled; never resolves without a receiver
async fn shutdown_requested(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        if rx.wait_for(|requested| *requested).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
