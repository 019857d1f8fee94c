use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::CatalogError;
use crate::retry::retry_with_backoff;
use crate::types::{SearchResponse, SearchResult};

/// Maximum number of pages to fetch for one collection before returning an
/// error. Prevents runaway loops on a bogus pagination block.
const MAX_PAGES: u32 = 200;

/// HTTP client for the SearchSpring search proxy's `/api/search` endpoint.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors. Transient errors (429, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct SearchClient {
    client: Client,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl SearchClient {
    /// Creates a `SearchClient` with configured timeout, `User-Agent`, and
    /// retry policy. `base_url` is the proxy root; tests point it at a
    /// wiremock server.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so join() appends to the
        // root path instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of search results for a collection, with automatic
    /// retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`CatalogError::NotFound`] — HTTP 404 (not retried).
    /// - [`CatalogError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`CatalogError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`CatalogError::Deserialize`] — response body is not valid JSON or
    ///   does not match the native results shape (not retried).
    pub async fn fetch_page(
        &self,
        handle: &str,
        page: u32,
        results_per_page: u32,
    ) -> Result<SearchResponse, CatalogError> {
        let url = self.search_url(handle, page, results_per_page);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(CatalogError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<SearchResponse>(&body).map_err(|e| {
                    CatalogError::Deserialize {
                        context: format!("search page {page} for collection '{handle}'"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Fetches every page of search results for a collection.
    ///
    /// Page 1 is fetched first; its pagination block decides how many more
    /// pages follow. The total pages figure is the proxy's concern — the
    /// caller only receives the flattened result sequence.
    ///
    /// `inter_request_delay_ms` is applied between page requests (after
    /// every page except the last).
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`]. Returns
    /// [`CatalogError::PaginationLimit`] if the pagination block claims
    /// more than [`MAX_PAGES`] pages.
    pub async fn fetch_collection(
        &self,
        handle: &str,
        results_per_page: u32,
        inter_request_delay_ms: u64,
    ) -> Result<Vec<SearchResult>, CatalogError> {
        let first = self.fetch_page(handle, 1, results_per_page).await?;
        let total_pages = first.pagination.total_pages;

        if total_pages > MAX_PAGES {
            return Err(CatalogError::PaginationLimit {
                handle: handle.to_owned(),
                total_pages,
                max_pages: MAX_PAGES,
            });
        }

        let mut all_results = first.results;
        for page in 2..=total_pages {
            if inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }
            let response = self.fetch_page(handle, page, results_per_page).await?;
            all_results.extend(response.results);
        }

        tracing::debug!(
            handle,
            total_pages,
            results = all_results.len(),
            "fetched collection from search API"
        );
        Ok(all_results)
    }

    /// Builds the `/api/search` URL for a collection page in the proxy's
    /// native results format, pinned to in-stock, non-past-project listings.
    fn search_url(&self, handle: &str, page: u32, results_per_page: u32) -> Url {
        // base_url always ends in "/", so join cannot fail on "api/search".
        let mut url = self
            .base_url
            .join("api/search")
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("resultsFormat", "native")
            .append_pair("resultsPerPage", &results_per_page.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("bgfilter.collection_handle", handle)
            .append_pair("bgfilter.ss_is_past_project", "false")
            .append_pair("filter.ss_availability_filter", "Available Now");
        url
    }
}
