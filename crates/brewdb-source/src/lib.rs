//! Upstream data acquisition for the brewery catalog.
//!
//! Fetches the complete dataset from the Open Brewery DB listing endpoint
//! page by page and normalizes each raw record into the canonical
//! [`brewdb_core::Brewery`] shape. Pure data acquisition — no caching or
//! shared-state concerns live here.

mod client;
mod error;
mod fetch_all;
mod normalize;
mod retry;
mod types;

pub use client::BreweryApiClient;
pub use error::{FetchError, SourceError};
pub use normalize::normalize_brewery;
pub use types::UpstreamBrewery;
