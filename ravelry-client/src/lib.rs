//! Ravelry side of the knitting recommender.
//!
//! - [`RavelryConfig`]: credentials and endpoints, read once from the environment
//! - [`RavelryClient`]: keyword search and batch detail fetch over HTTP basic auth
//! - [`crawl_categories`]: per-category search, cross-category id dedup, one detail fetch
//! - [`normalize`]: raw nested payloads → flat [`PatternRecord`]s

mod client;
mod config;
mod crawler;
mod errors;
pub mod normalize;
mod record;

pub use client::{MAX_PAGE_SIZE, RavelryClient, SearchPage, SearchRequest};
pub use config::RavelryConfig;
pub use crawler::{CrawlOptions, DEFAULT_CATEGORIES, PatternApi, crawl_categories};
pub use errors::{NormalizeError, RavelryError};
pub use normalize::{NormalizeOptions, extract_key_values, normalize_details, normalize_pattern};
pub use record::PatternRecord;
