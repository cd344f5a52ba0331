//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers exchanged with the reporting service.
//! Each type keeps template ids, report ids and cursors from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report template identifier
///
/// Selects which report series the remote service should walk.
///
/// # Examples
///
/// ```
/// use cleos_sync::domain::ids::TemplateId;
/// use std::str::FromStr;
///
/// let template_id = TemplateId::from_str("275").unwrap();
/// assert_eq!(template_id.as_str(), "275");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a new TemplateId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(TemplateId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Template ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the template ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TemplateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Report identifier, unique within a series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Creates a new ReportId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Report ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the report ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Resume position within a series
///
/// A cursor is the identifier of the last report consumed. The empty cursor
/// means "no prior report" and is sent verbatim as `idAfter=`, which the
/// service interprets as the beginning of the series.
///
/// # Examples
///
/// ```
/// use cleos_sync::domain::ids::{Cursor, ReportId};
///
/// let start = Cursor::start();
/// assert!(start.is_start());
///
/// let id = ReportId::new("11661").unwrap();
/// assert_eq!(Cursor::after(&id).as_str(), "11661");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// The "no prior report" cursor
    pub fn start() -> Self {
        Self(String::new())
    }

    /// Cursor positioned right after the given report
    pub fn after(report_id: &ReportId) -> Self {
        Self(report_id.as_str().to_string())
    }

    /// Parses a stored cursor value; blank values map to [`Cursor::start`]
    pub fn from_stored(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::start()
        } else {
            Self(value)
        }
    }

    /// Returns true for the "no prior report" cursor
    pub fn is_start(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the cursor as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_start() {
            f.write_str("<start>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&ReportId> for Cursor {
    fn from(id: &ReportId) -> Self {
        Cursor::after(id)
    }
}
