//! Naver Finance scrapers.
//!
//! Scraping happens in two phases, like any listing-driven news source:
//!
//! 1. **Indexing**: page through a company's news listing and extract one
//!    row per article ([`listing`] fetches, [`parser`] extracts)
//! 2. **Fetching**: download the article pages and pull out their body text
//!    ([`article`])
//!
//! | Module | Role | Notes |
//! |--------|------|-------|
//! | [`listing`] | HTTP transport for listing pages | One GET per page, non-2xx is an error |
//! | [`parser`] | Listing row extraction | Malformed rows are skipped, never fatal |
//! | [`article`] | Article body download | Failed fetches are logged and skipped |
//!
//! The crawl controller only sees the [`PageSource`] trait, so tests drive it
//! with canned markup instead of the network.

pub mod article;
pub mod listing;
pub mod parser;

use crate::error::NewsError;
use url::Url;

/// A paginated news listing for one company.
pub trait PageSource {
    /// Origin that relative article links are resolved against.
    fn origin(&self) -> &Url;

    /// Fetch the raw markup of listing page `page` (1-based).
    async fn fetch_page(&self, page: u32) -> Result<String, NewsError>;
}
