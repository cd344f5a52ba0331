//! Response status classification
//!
//! The reporting service signals everything through the status code. Only
//! `200 OK` carries a report; `202` and `204` are non-error terminal signals.

use crate::domain::errors::FailureKind;
use reqwest::StatusCode;

/// How a response status is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Body holds the next report
    Success,
    /// All available reports downloaded, retry later
    Exhausted,
    /// The next report is still being generated, retry later
    NotReady,
    /// Fatal for the run
    Failed(FailureKind),
}

/// Classify a response status
pub fn classify(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::OK => StatusClass::Success,
        StatusCode::ACCEPTED => StatusClass::Exhausted,
        StatusCode::NO_CONTENT => StatusClass::NotReady,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StatusClass::Failed(FailureKind::Auth),
        StatusCode::CONFLICT => StatusClass::Failed(FailureKind::RemoteExecution),
        StatusCode::GONE => StatusClass::Failed(FailureKind::SeriesClosed),
        StatusCode::BAD_REQUEST => StatusClass::Failed(FailureKind::InvalidArgument),
        StatusCode::NOT_FOUND => StatusClass::Failed(FailureKind::NotFound),
        _ => StatusClass::Failed(FailureKind::Unknown),
    }
}

/// Operator-facing explanation for a failed status
pub fn explain(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::CONFLICT => "report failed execution, contact support",
        StatusCode::GONE => {
            "no future reports on this template will be generated, \
             stop the job or update the template id"
        }
        StatusCode::BAD_REQUEST => "invalid arguments",
        StatusCode::NOT_FOUND => "a report for the specified template id was not found",
        _ => "unknown status",
    }
}
