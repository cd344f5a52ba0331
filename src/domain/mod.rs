//! Domain models and types for cleos-sync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`TemplateId`], [`ReportId`], [`Cursor`])
//! - **Domain models** ([`Series`], [`Report`], [`FetchOutcome`])
//! - **Error types** ([`SyncError`], [`FailureKind`], [`Failure`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a report id can never be passed
//! where a template id is expected:
//!
//! ```rust
//! use cleos_sync::domain::{Cursor, ReportId, TemplateId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let template_id = TemplateId::new("275")?;
//! let report_id = ReportId::new("11661")?;
//! let cursor = Cursor::after(&report_id);
//!
//! // let wrong: TemplateId = report_id;  // Compile error!
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod report;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{Failure, FailureKind, SyncError};
pub use ids::{Cursor, ReportId, TemplateId};
pub use report::{FetchOutcome, Report, Series};
pub use result::Result;
