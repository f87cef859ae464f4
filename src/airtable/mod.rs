//! Airtable integration: request building, fetching, and the cached
//! retrieval pipeline.

pub mod api_types;
mod cache_key;
mod client;
mod connector;
mod error;
mod types;

pub use cache_key::{TableQuery, CACHE_NAMESPACE};
pub use client::{AirtableClient, BuiltRequest, API_ROOT};
pub use connector::Connector;
pub use error::FetchError;
pub use types::{FetchOutcome, FilterInfo};
