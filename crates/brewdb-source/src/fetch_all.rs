//! Multi-page fetch loop for [`BreweryApiClient`].

use brewdb_core::Brewery;
use chrono::Utc;

use crate::client::BreweryApiClient;
use crate::error::FetchError;
use crate::normalize::normalize_brewery;

impl BreweryApiClient {
    /// Fetches the complete upstream dataset by iterating numbered pages.
    ///
    /// Starts at page 1 and requests `per_page` records per call. Iteration
    /// stops when a page returns fewer records than requested (end of data)
    /// or when `max_pages` pages have been fetched — the latter is a safety
    /// bound against a misbehaving upstream and is logged as a warning, not
    /// an error.
    ///
    /// **All-or-nothing semantics**: on any page failure, already-fetched
    /// records from earlier pages are discarded and the error is returned.
    /// A partial dataset must never replace a complete snapshot.
    ///
    /// Records that fail normalization (empty identity fields) are dropped
    /// individually and do not fail the batch.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] wrapping the page-level error together with the
    /// number of pages that had completed before the failure.
    pub async fn fetch_all(
        &self,
        per_page: u32,
        max_pages: u32,
    ) -> Result<Vec<Brewery>, FetchError> {
        let fetched_at = Utc::now();
        let mut all: Vec<Brewery> = Vec::new();
        let mut dropped = 0usize;
        let mut page = 1u32;

        loop {
            let records = self
                .fetch_page(page, per_page)
                .await
                .map_err(|source| FetchError {
                    pages_fetched: page - 1,
                    source,
                })?;

            let count = records.len();
            for raw in records {
                match normalize_brewery(raw, fetched_at) {
                    Some(brewery) => all.push(brewery),
                    None => dropped += 1,
                }
            }
            tracing::debug!(page, count, "fetched upstream page");

            if count < per_page as usize {
                break;
            }
            if page >= max_pages {
                tracing::warn!(max_pages, "reached upstream page ceiling; stopping fetch");
                break;
            }
            page += 1;
        }

        if dropped > 0 {
            tracing::warn!(dropped, "dropped upstream records failing normalization");
        }
        tracing::info!(total = all.len(), pages = page, "upstream fetch complete");
        Ok(all)
    }
}
