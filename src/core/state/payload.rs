//! Checkpoint payload and invocation trigger codecs
//!
//! The scheduler job that triggers a run carries an opaque `data` field. The
//! field holds base64-encoded JSON of the form `{"previousReportId": "..."}`.

use crate::domain::errors::SyncError;
use crate::domain::ids::Cursor;
use crate::domain::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Checkpoint record stored in the job data field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// Identifier of the last committed report; empty before the first commit
    #[serde(rename = "previousReportId", default)]
    pub previous_report_id: String,
}

impl CheckpointPayload {
    /// Payload recording `cursor`
    pub fn from_cursor(cursor: &Cursor) -> Self {
        Self {
            previous_report_id: cursor.as_str().to_string(),
        }
    }

    /// Cursor recorded by this payload
    pub fn cursor(&self) -> Cursor {
        Cursor::from_stored(self.previous_report_id.clone())
    }

    /// Encode as base64 JSON
    pub fn to_base64(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Decode from base64 JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not base64 or does not decode to the
    /// expected JSON shape.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
        serde_json::from_slice(&bytes).map_err(|e| {
            SyncError::Checkpoint(format!("Invalid checkpoint payload: {e}"))
        })
    }
}

/// Event that starts one sync invocation
///
/// ```
/// use cleos_sync::core::state::TriggerEvent;
///
/// let event = TriggerEvent::from_json(r#"{"data": "eyJwcmV2aW91c1JlcG9ydElkIjoiQiJ9"}"#).unwrap();
/// assert_eq!(event.payload().unwrap().cursor().as_str(), "B");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Base64 JSON checkpoint payload
    #[serde(default)]
    pub data: Option<String>,
}

impl TriggerEvent {
    /// Trigger carrying `payload`
    pub fn with_payload(payload: &CheckpointPayload) -> Result<Self> {
        Ok(Self {
            data: Some(payload.to_base64()?),
        })
    }

    /// Parse a trigger from its JSON message body
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SyncError::Validation(format!("Invalid trigger event: {e}")))
    }

    /// Checkpoint payload carried by the trigger
    ///
    /// A missing or blank `data` field yields the empty payload, which seeds
    /// the run from the start of the series.
    pub fn payload(&self) -> Result<CheckpointPayload> {
        match self.data.as_deref().map(str::trim) {
            None | Some("") => Ok(CheckpointPayload::default()),
            Some(data) => CheckpointPayload::from_base64(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::ReportId;

    #[test]
    fn test_payload_wire_format() {
        let payload = CheckpointPayload::from_cursor(&Cursor::from_stored("11661"));
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"previousReportId":"11661"}"#);
        assert_eq!(
            payload.to_base64().unwrap(),
            general_purpose::STANDARD.encode(json)
        );
    }

    #[test]
    fn test_payload_decodes_cursor() {
        let encoded = general_purpose::STANDARD.encode(r#"{"previousReportId":"B"}"#);
        let payload = CheckpointPayload::from_base64(&encoded).unwrap();
        assert_eq!(payload.cursor(), Cursor::after(&ReportId::new("B").unwrap()));
    }

    #[test]
    fn test_payload_empty_object_is_start() {
        let encoded = general_purpose::STANDARD.encode("{}");
        let payload = CheckpointPayload::from_base64(&encoded).unwrap();
        assert!(payload.cursor().is_start());
    }

    #[test]
    fn test_payload_rejects_garbage() {
        assert!(CheckpointPayload::from_base64("%%%").is_err());
        let not_json = general_purpose::STANDARD.encode("not json");
        assert!(matches!(
            CheckpointPayload::from_base64(&not_json),
            Err(SyncError::Checkpoint(_))
        ));
    }

    #[test]
    fn test_trigger_without_data_starts_series() {
        let event = TriggerEvent::from_json("{}").unwrap();
        assert!(event.payload().unwrap().cursor().is_start());

        let event = TriggerEvent::from_json(r#"{"data": ""}"#).unwrap();
        assert!(event.payload().unwrap().cursor().is_start());
    }

    #[test]
    fn test_trigger_with_payload() {
        let payload = CheckpointPayload::from_cursor(&Cursor::from_stored("C"));
        let event = TriggerEvent::with_payload(&payload).unwrap();
        assert_eq!(event.payload().unwrap(), payload);
    }

    #[test]
    fn test_trigger_invalid_json() {
        assert!(matches!(
            TriggerEvent::from_json("not json"),
            Err(SyncError::Validation(_))
        ));
    }
}
