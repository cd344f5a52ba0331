//! Reports, series and fetch outcomes
//!
//! A [`Series`] names an append-only sequence of reports on the remote service.
//! One fetch against it yields exactly one [`FetchOutcome`].

use super::errors::Failure;
use super::ids::{ReportId, TemplateId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date layout expected by the reporting service
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

/// An independent, totally ordered sequence of reports
///
/// Immutable for the lifetime of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Series {
    /// Template the reports are generated from
    pub template_id: TemplateId,

    /// Lower bound on the order date of reports in the series
    pub first_ordered_date: NaiveDate,
}

impl Series {
    /// Creates a new series
    pub fn new(template_id: TemplateId, first_ordered_date: NaiveDate) -> Self {
        Self {
            template_id,
            first_ordered_date,
        }
    }

    /// Key used to address checkpoint records for this series
    ///
    /// Format: `"{template_id}_{YYYY-MM-DD}"`
    pub fn key(&self) -> String {
        format!("{}_{}", self.template_id.as_str(), self.formatted_date())
    }

    /// The lower bound formatted the way the service expects it
    pub fn formatted_date(&self) -> String {
        self.first_ordered_date.format(DATE_LAYOUT).to_string()
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One immutable report fetched from the service
#[derive(Clone, PartialEq, Eq)]
pub struct Report {
    /// Identifier, unique within the series
    pub id: ReportId,

    /// Raw report bytes
    pub content: Vec<u8>,

    /// Declared content type
    pub content_type: String,

    /// Filename taken from the content disposition
    pub filename: String,
}

impl Report {
    /// Name under which the sink stores this report
    ///
    /// Derived from the identifier so re-delivery overwrites the same object.
    pub fn object_name(&self) -> String {
        format!("{}_{}", self.id.as_str(), self.filename)
    }

    /// Size of the content in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("id", &self.id)
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Result of a single fetch against the report source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The next report after the cursor
    Delivered(Report),

    /// Nothing new yet; try again later
    Exhausted,

    /// The next report is still being generated
    NotReady,

    /// The fetch failed and the run must stop
    Failed(Failure),
}

impl FetchOutcome {
    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Delivered(_) => "delivered",
            FetchOutcome::Exhausted => "exhausted",
            FetchOutcome::NotReady => "not_ready",
            FetchOutcome::Failed(_) => "failed",
        }
    }
}
