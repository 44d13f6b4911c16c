//! HTTP client for the upstream brewery listing endpoint.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;
use crate::types::UpstreamBrewery;

const DEFAULT_BASE_URL: &str = "https://api.openbrewerydb.org/v1/breweries";

/// HTTP client for the Open Brewery DB listing endpoint.
///
/// Handles rate limiting (429) and other non-2xx responses as typed errors.
/// Pages are requested by number (`page`/`per_page` query parameters);
/// pagination ends when a page returns fewer records than requested.
///
/// Transient errors (429, network failures) are automatically retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct BreweryApiClient {
    client: Client,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl BreweryApiClient {
    /// Creates a new client pointed at the production Open Brewery DB API.
    ///
    /// `max_retries` is the number of additional attempts after the first failure
    /// for retriable errors (429, network errors). Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_secs,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of raw brewery records, with automatic retry on
    /// transient errors.
    ///
    /// # Errors
    ///
    /// - [`SourceError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`SourceError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`SourceError::Http`] — network failure after all retries exhausted.
    /// - [`SourceError::Deserialize`] — response body is not a JSON array of
    ///   records (not retried).
    pub async fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<UpstreamBrewery>, SourceError> {
        let url = self.page_url(page, per_page);

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

                    return Err(SourceError::RateLimited { retry_after_secs });
                }

                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<Vec<UpstreamBrewery>>(&body).map_err(|e| {
                    SourceError::Deserialize {
                        context: format!("breweries page {page}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Builds the listing URL for the given page number and page size.
    fn page_url(&self, page: u32, per_page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        url
    }
}
