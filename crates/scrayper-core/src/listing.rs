//! Listing paginator: one GET per page index, strict about failures.
//!
//! Any transport error or non-200 status on a listing page is returned as a
//! [`ListingFetchError`], which the pipeline treats as fatal.

use url::Url;

use crate::config::SourceConfig;
use crate::error::ListingFetchError;
use crate::extract::ListingPage;
use crate::http::{self, GetOptions};

/// Build the URL of listing page `page`: `&page=N` appended to the base URL's query.
pub fn page_url(base: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&page={}", existing, page),
        _ => format!("&page={}", page),
    };
    url.set_query(Some(&query));
    Ok(url)
}

/// Fetches listing pages for one source.
pub struct Paginator<'a> {
    source: &'a SourceConfig,
    http: GetOptions,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a SourceConfig) -> Self {
        Self {
            source,
            http: GetOptions::default(),
        }
    }

    /// Log the banner that opens a source's page range.
    pub fn announce(&self) {
        tracing::info!("####################################");
        tracing::info!("Brought to you by {}", self.source.name);
        tracing::info!("####################################");
        tracing::info!(
            first = self.source.first_page,
            last = self.source.last_page,
            "harvesting {}",
            self.source.listing_base_url
        );
    }

    /// Fetch and parse page `index`. Only an HTTP 200 response is parsed.
    pub fn fetch_page(&self, index: u32) -> Result<ListingPage, ListingFetchError> {
        let url = page_url(&self.source.listing_base_url, index).map_err(|source| {
            ListingFetchError::InvalidUrl {
                page: index,
                url: self.source.listing_base_url.clone(),
                source,
            }
        })?;
        tracing::debug!(page = index, "fetching listing page {}", url);

        let response =
            http::get(url.as_str(), self.http).map_err(|source| ListingFetchError::Transport {
                page: index,
                url: url.to_string(),
                source,
            })?;
        if response.status != 200 {
            return Err(ListingFetchError::Status {
                page: index,
                url: url.to_string(),
                status: response.status,
                status_text: response.status_text(),
            });
        }

        let html = String::from_utf8_lossy(&response.body);
        Ok(ListingPage::parse(index, &html))
    }
}
