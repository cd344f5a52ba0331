//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use cleos_sync::adapters::traits::{CheckpointStore, ReportSink, ReportSource, StoredObject};
use cleos_sync::domain::{
    Cursor, FetchOutcome, Report, ReportId, Result, Series, SyncError, TemplateId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn series() -> Series {
    Series::new(
        TemplateId::new("275").unwrap(),
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    )
}

pub fn report(id: &str) -> Report {
    Report {
        id: ReportId::new(id).unwrap(),
        content: format!("report {id}\n").into_bytes(),
        content_type: "text/csv".to_string(),
        filename: format!("clearing {id}.csv"),
    }
}

pub fn cursor(value: &str) -> Cursor {
    Cursor::from_stored(value)
}

/// Remote series holding `reports` in order; `tail` is returned once the
/// cursor is at the end
pub struct SeriesSource {
    reports: Vec<String>,
    tail: FetchOutcome,
    calls: Mutex<Vec<Cursor>>,
}

impl SeriesSource {
    pub fn new(reports: &[&str], tail: FetchOutcome) -> Self {
        Self {
            reports: reports.iter().map(|s| s.to_string()).collect(),
            tail,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Cursor> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportSource for SeriesSource {
    async fn fetch(&self, _series: &Series, cursor: &Cursor) -> FetchOutcome {
        self.calls.lock().unwrap().push(cursor.clone());

        let next = if cursor.is_start() {
            0
        } else {
            match self.reports.iter().position(|id| id == cursor.as_str()) {
                Some(idx) => idx + 1,
                None => return FetchOutcome::Exhausted,
            }
        };

        match self.reports.get(next) {
            Some(id) => FetchOutcome::Delivered(report(id)),
            None => self.tail.clone(),
        }
    }

    fn describe(&self) -> String {
        "memory://series".to_string()
    }
}

/// Source that returns a fixed script of outcomes regardless of the cursor
pub struct ScriptedSource {
    script: Mutex<Vec<FetchOutcome>>,
}

impl ScriptedSource {
    pub fn new(mut script: Vec<FetchOutcome>) -> Self {
        script.reverse();
        Self {
            script: Mutex::new(script),
        }
    }
}

#[async_trait]
impl ReportSource for ScriptedSource {
    async fn fetch(&self, _series: &Series, _cursor: &Cursor) -> FetchOutcome {
        self.script.lock().unwrap().pop().unwrap_or(FetchOutcome::Exhausted)
    }

    fn describe(&self) -> String {
        "memory://scripted".to_string()
    }
}

/// Source whose fetch never completes within a test
pub struct HangingSource;

#[async_trait]
impl ReportSource for HangingSource {
    async fn fetch(&self, _series: &Series, _cursor: &Cursor) -> FetchOutcome {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        FetchOutcome::Exhausted
    }

    fn describe(&self) -> String {
        "memory://hanging".to_string()
    }
}

/// Object sink keyed by object name; overwrites on re-delivery
#[derive(Default)]
pub struct MemorySink {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    log: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
    hang: AtomicBool,
}

impl MemorySink {
    pub fn failing_on(id: &str) -> Self {
        let sink = Self::default();
        *sink.fail_on.lock().unwrap() = Some(id.to_string());
        sink
    }

    pub fn hanging() -> Self {
        let sink = Self::default();
        sink.hang.store(true, Ordering::SeqCst);
        sink
    }

    /// Report ids in the order `store` succeeded
    pub fn stored_ids(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn store(&self, report: &Report) -> Result<StoredObject> {
        if self.hang.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_on.lock().unwrap().as_deref() == Some(report.id.as_str()) {
            return Err(SyncError::Storage(format!("bucket rejected {}", report.id)));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(report.object_name(), report.content.clone());
        self.log.lock().unwrap().push(report.id.to_string());
        Ok(StoredObject::for_report(report))
    }
}

/// Checkpoint store recording every write
#[derive(Default)]
pub struct MemoryCheckpoints {
    committed: Mutex<HashMap<String, Cursor>>,
    writes: Mutex<Vec<Cursor>>,
    fail_writes: AtomicBool,
    hang_writes: AtomicBool,
}

impl MemoryCheckpoints {
    pub fn seeded(series: &Series, cursor: Cursor) -> Self {
        let store = Self::default();
        store.committed.lock().unwrap().insert(series.key(), cursor);
        store
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn hang_writes(&self) {
        self.hang_writes.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<Cursor> {
        self.writes.lock().unwrap().clone()
    }

    pub fn committed(&self, series: &Series) -> Cursor {
        self.committed
            .lock()
            .unwrap()
            .get(&series.key())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoints {
    async fn read(&self, series: &Series) -> Result<Cursor> {
        Ok(self.committed(series))
    }

    async fn write(&self, series: &Series, cursor: &Cursor) -> Result<()> {
        if self.hang_writes.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Checkpoint("scheduler API unavailable".to_string()));
        }
        self.writes.lock().unwrap().push(cursor.clone());
        self.committed
            .lock()
            .unwrap()
            .insert(series.key(), cursor.clone());
        Ok(())
    }
}
