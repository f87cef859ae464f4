//! Airtable content-display connector.
//!
//! Fetches records from the Airtable API, caches outcomes under a key
//! derived from the request shape, and renders embeddable HTML fragments.

pub mod airtable;
pub mod cache;
pub mod config;
pub mod formula;
pub mod render;
