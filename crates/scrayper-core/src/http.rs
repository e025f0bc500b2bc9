//! Blocking HTTP GET over libcurl.
//!
//! Shared by the listing paginator and the sample fetcher. Follows redirects
//! and buffers the whole body. Runs in the current thread; call from
//! `spawn_blocking` if used from async code.

use std::str;
use std::time::Duration;

/// Maximum redirects followed per request.
pub const MAX_REDIRECTIONS: u32 = 10;

/// Per-request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Whole-transfer timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// A completed response: final status code, its status line and the full body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    /// Status line without the protocol, e.g. `404 Not Found`. Empty if the
    /// server sent none that could be decoded.
    pub status_line: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Human-readable status: the status line if present, else the bare code.
    pub fn status_text(&self) -> String {
        if self.status_line.is_empty() {
            self.status.to_string()
        } else {
            self.status_line.clone()
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issue a single GET and collect the response.
///
/// Only transport failures are errors; every HTTP status is returned as a
/// response for the caller to classify.
pub fn get(url: &str, opts: GetOptions) -> Result<HttpResponse, curl::Error> {
    let mut body: Vec<u8> = Vec::new();
    let mut status_line = String::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTIONS)?;
    if let Some(timeout) = opts.timeout {
        easy.timeout(timeout)?;
    }

    {
        let mut transfer = easy.transfer();
        // The last status line wins so redirects report the final hop.
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                if let Some(text) = parse_status_line(line) {
                    status_line = text;
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse {
        status,
        status_line,
        body,
    })
}

/// `HTTP/1.1 404 Not Found` -> `404 Not Found`. Non-status header lines yield `None`.
fn parse_status_line(line: &str) -> Option<String> {
    let line = line.trim_end();
    if !line.starts_with("HTTP/") {
        return None;
    }
    let (_, rest) = line.split_once(' ')?;
    Some(rest.trim().to_string())
}
