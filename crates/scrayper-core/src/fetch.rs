//! Sample fetcher: one GET per listed host, classified into a [`FetchOutcome`].
//!
//! Only 404 counts as "not found"; every other status is handed on as a
//! success with its body. Transport errors are row-level and never escape.

use std::time::Duration;

use crate::extract::RowRecord;
use crate::http::{self, GetOptions, HttpResponse};

/// Result of trying to download one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { status: u32, bytes: Vec<u8> },
    NotFound,
    NetworkError { kind: NetworkErrorKind, cause: String },
}

/// Coarse class of a transport failure, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connection,
    Other,
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> NetworkErrorKind {
    if e.is_operation_timedout() {
        return NetworkErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return NetworkErrorKind::Connection;
    }
    NetworkErrorKind::Other
}

/// Classify a completed response.
pub fn classify_response(response: HttpResponse) -> FetchOutcome {
    if response.status == 404 {
        FetchOutcome::NotFound
    } else {
        FetchOutcome::Success {
            status: response.status,
            bytes: response.body,
        }
    }
}

/// Download URL for a listed host. Listing hosts carry no scheme, so `http://`
/// is prefixed unless one is already present.
pub fn sample_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

pub struct SampleFetcher {
    http: GetOptions,
}

impl SampleFetcher {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            http: GetOptions { timeout },
        }
    }

    pub fn fetch_sample(&self, row: &RowRecord) -> FetchOutcome {
        let url = sample_url(&row.host);
        tracing::info!(
            ip = row.ip.as_deref().unwrap_or("-"),
            country = row.country.as_deref().unwrap_or("-"),
            "download malware from {}",
            url
        );

        match http::get(&url, self.http) {
            Ok(response) => {
                tracing::info!("[{}]", response.status_text());
                classify_response(response)
            }
            Err(e) => {
                let kind = classify_curl_error(&e);
                tracing::warn!(?kind, "[NG] {}", e);
                FetchOutcome::NetworkError {
                    kind,
                    cause: e.to_string(),
                }
            }
        }
    }
}
