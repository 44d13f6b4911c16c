use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by upstream (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid upstream base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// A multi-page fetch that failed partway through.
///
/// Records from pages fetched before the failure are discarded by the caller;
/// `pages_fetched` is kept for diagnostics only.
#[derive(Debug, Error)]
#[error("upstream fetch failed after {pages_fetched} complete pages: {source}")]
pub struct FetchError {
    pub pages_fetched: u32,
    #[source]
    pub source: SourceError,
}
