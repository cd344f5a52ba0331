//! HTTP client for the partner reporting API
//!
//! Implements [`ReportSource`] against
//! `GET {base}/partner-reports/report/next/content`. One call is one request:
//! there are no retries here, the next scheduled run retries from the last
//! committed cursor.

use super::disposition::extract_filename;
use super::status::{classify, explain, StatusClass};
use crate::adapters::traits::ReportSource;
use crate::config::{ApiConfig, SecretString, SyncConfig};
use crate::domain::errors::{Failure, FailureKind, SyncError};
use crate::domain::ids::{Cursor, ReportId};
use crate::domain::report::{FetchOutcome, Report, Series};
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use url::Url;

/// Path of the "next report" endpoint relative to the base path
pub const NEXT_REPORT_PATH: &str = "/partner-reports/report/next/content";

/// Content type assumed when the response does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const BODY_SNIPPET_LEN: usize = 200;

/// Reporting API client
///
/// # Example
///
/// ```no_run
/// use cleos_sync::adapters::cleos::CleosClient;
/// use cleos_sync::config::ApiConfig;
///
/// # fn example() -> cleos_sync::domain::Result<()> {
/// let client = CleosClient::new(
///     "https://api.dev.entur.io/cleos-reporting/api/v1",
///     &ApiConfig::default(),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct CleosClient {
    /// Base path, without trailing slash
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// Bearer token, if any
    token: Option<SecretString>,

    /// Response header carrying the report identifier
    report_id_header: String,
}

impl CleosClient {
    /// Create a client for `base_url` using the timeouts and TLS settings in `api`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: impl Into<String>, api: &ApiConfig) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| SyncError::Configuration(format!("Invalid base URL '{base_url}': {e}")))?;

        let mut client_builder = ClientBuilder::new()
            .timeout(api.timeout())
            .connect_timeout(api.connect_timeout());

        if !api.tls_verify {
            tracing::warn!(base_url = %base_url, "TLS certificate verification disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| SyncError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            token: api.token.clone(),
            report_id_header: api.report_id_header.clone(),
        })
    }

    /// Create a client from the full configuration
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Self::new(config.base_url(), &config.api)
    }

    /// URL of the next report after `cursor`
    ///
    /// The start cursor is sent as an empty `idAfter`.
    pub fn next_report_url(&self, series: &Series, cursor: &Cursor) -> Result<Url> {
        let endpoint = format!("{}{}", self.base_url, NEXT_REPORT_PATH);
        let date = series.formatted_date();
        Url::parse_with_params(
            &endpoint,
            &[
                ("templateId", series.template_id.as_str()),
                ("idAfter", cursor.as_str()),
                ("firstOrderedDate", date.as_str()),
            ],
        )
        .map_err(|e| SyncError::Validation(format!("Invalid request URL: {e}")))
    }

    async fn next_report(
        &self,
        series: &Series,
        cursor: &Cursor,
    ) -> std::result::Result<FetchOutcome, Failure> {
        let url = self
            .next_report_url(series, cursor)
            .map_err(|e| Failure::new(FailureKind::InvalidArgument, e.to_string()))?;

        tracing::debug!(url = %url, "Requesting next report");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret().as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Failure::new(FailureKind::Transport, format!("Request failed: {e}")))?;

        let status = response.status();
        match classify(status) {
            StatusClass::Success => {}
            StatusClass::Exhausted => return Ok(FetchOutcome::Exhausted),
            StatusClass::NotReady => return Ok(FetchOutcome::NotReady),
            StatusClass::Failed(kind) => {
                let body = response.text().await.unwrap_or_default();
                let body: String = body.chars().take(BODY_SNIPPET_LEN).collect();
                let mut message = format!("{} (status {status})", explain(status));
                if !body.trim().is_empty() {
                    message.push_str(": ");
                    message.push_str(body.trim());
                }
                return Err(Failure::new(kind, message));
            }
        }

        let headers = response.headers().clone();
        let id = self.report_id(&headers)?;
        let content_type = header_value(&headers, CONTENT_TYPE.as_str())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let disposition = header_value(&headers, CONTENT_DISPOSITION.as_str()).ok_or_else(|| {
            Failure::new(
                FailureKind::InvalidResponse,
                format!("Report {id} has no Content-Disposition header"),
            )
        })?;
        let filename = extract_filename(&disposition).map_err(|e| {
            Failure::new(
                FailureKind::InvalidResponse,
                format!("Unable to parse content disposition of report {id}: {e}"),
            )
        })?;

        let content = response.bytes().await.map_err(|e| {
            Failure::new(
                FailureKind::Transport,
                format!("Failed to read body of report {id}: {e}"),
            )
        })?;

        Ok(FetchOutcome::Delivered(Report {
            id,
            content: content.to_vec(),
            content_type,
            filename,
        }))
    }

    fn report_id(&self, headers: &HeaderMap) -> std::result::Result<ReportId, Failure> {
        header_value(headers, &self.report_id_header)
            .and_then(|v| ReportId::new(v.trim()).ok())
            .ok_or_else(|| {
                Failure::new(
                    FailureKind::InvalidResponse,
                    format!("Response is missing the {} header", self.report_id_header),
                )
            })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

#[async_trait]
impl ReportSource for CleosClient {
    async fn fetch(&self, series: &Series, cursor: &Cursor) -> FetchOutcome {
        match self.next_report(series, cursor).await {
            Ok(outcome) => outcome,
            Err(failure) => FetchOutcome::Failed(failure),
        }
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::TemplateId;
    use chrono::NaiveDate;

    fn series() -> Series {
        Series::new(
            TemplateId::new("275").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_next_report_url_start_cursor() {
        let client =
            CleosClient::new("https://example.test/api/v1/", &ApiConfig::default()).unwrap();
        let url = client.next_report_url(&series(), &Cursor::start()).unwrap();
        assert_eq!(
            url.as_str(),
            concat!(
                "https://example.test/api/v1/partner-reports/report/next/content",
                "?templateId=275&idAfter=&firstOrderedDate=2020-01-01"
            )
        );
    }

    #[test]
    fn test_next_report_url_encodes_cursor() {
        let client =
            CleosClient::new("https://example.test/api/v1", &ApiConfig::default()).unwrap();
        let cursor = Cursor::from_stored("a b&c");
        let url = client.next_report_url(&series(), &cursor).unwrap();
        let id_after = url
            .query_pairs()
            .find(|(k, _)| k == "idAfter")
            .map(|(_, v)| v.into_owned());
        assert_eq!(id_after.as_deref(), Some("a b&c"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(CleosClient::new("not a url", &ApiConfig::default()).is_err());
    }

    #[test]
    fn test_describe_is_base_url() {
        let client =
            CleosClient::new("https://example.test/api/v1", &ApiConfig::default()).unwrap();
        assert_eq!(client.describe(), "https://example.test/api/v1");
    }
}
