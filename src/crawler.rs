//! Crawl controller: pagination, date-window policy and exact-match dedup.
//!
//! The listing is ordered newest first. For each page the controller parses
//! the rows and classifies them against the window and the process-start date:
//!
//! | Row date | Action |
//! |----------|--------|
//! | after today | discard (future/sentinel row), keep scanning |
//! | before `date_from` | boundary reached, stop the whole crawl |
//! | after `date_to` | discard, keep scanning |
//! | otherwise | candidate |
//!
//! A candidate is kept only if neither its link nor its normalized title has
//! been seen earlier in the crawl. The crawl ends at the boundary, at the
//! first page with no rows, or after `max_pages` pages.
//!
//! # Fetch strategies
//!
//! [`FetchStrategy::Sequential`] requests one page at a time and never asks
//! for a page after the crawl has stopped. [`FetchStrategy::Concurrent`]
//! requests all `max_pages` pages at once, then runs the same page-ordered
//! classification; pages past the stop point are downloaded but ignored.
//!
//! Any transport error aborts the crawl and nothing collected so far is
//! returned.

use crate::error::NewsError;
use crate::models::{ArticleRecord, CrawlWindow};
use crate::scrapers::PageSource;
use crate::scrapers::parser::{RawRow, parse_page};
use chrono::NaiveDate;
use clap::ValueEnum;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// How listing pages are requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// One request at a time, stopping early at the date boundary.
    #[default]
    Sequential,
    /// All pages requested together; lower latency, no early stop on the wire.
    Concurrent,
}

/// What a processed page tells the controller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Continue,
    EndOfListing,
    BoundaryReached,
}

/// Dedup state and accumulated records of one crawl.
#[derive(Debug)]
struct Collector<'w> {
    window: &'w CrawlWindow,
    today: NaiveDate,
    seen_links: HashSet<String>,
    seen_titles: HashSet<String>,
    records: Vec<ArticleRecord>,
}

impl<'w> Collector<'w> {
    fn new(window: &'w CrawlWindow, today: NaiveDate) -> Self {
        Self {
            window,
            today,
            seen_links: HashSet::new(),
            seen_titles: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn absorb(&mut self, page: u32, rows: Vec<RawRow>) -> PageOutcome {
        if rows.is_empty() {
            info!(page, "Page has no rows; end of listing");
            return PageOutcome::EndOfListing;
        }

        let mut kept = 0usize;
        for row in rows {
            let date = row.published_at.date();

            if date > self.today {
                debug!(page, %date, title = %row.title, "Skipping future-dated row");
                continue;
            }
            if self.window.date_from.is_some_and(|from| date < from) {
                info!(page, %date, kept, "Row older than window start; stopping crawl");
                return PageOutcome::BoundaryReached;
            }
            if !self.window.contains(date) {
                debug!(page, %date, "Skipping row newer than window end");
                continue;
            }

            let record = ArticleRecord::from(row);
            if self.seen_links.contains(&record.link)
                || self.seen_titles.contains(record.normalized_title())
            {
                debug!(page, title = %record.title, link = %record.link, "Dropping duplicate");
                continue;
            }
            self.seen_links.insert(record.link.clone());
            self.seen_titles.insert(record.normalized_title().to_string());
            debug!(page, date = %record.published_at, title = %record.title, "Added news");
            self.records.push(record);
            kept += 1;
        }

        debug!(page, kept, "Page processed");
        PageOutcome::Continue
    }
}

/// Crawl the listing behind `source` and return the unique in-window records
/// in listing order.
///
/// `today` is the process-start date; rows dated after it are discarded.
#[instrument(level = "info", skip(source, window), fields(
    date_from = ?window.date_from,
    date_to = ?window.date_to,
    max_pages = window.max_pages,
))]
pub async fn crawl<S: PageSource>(
    source: &S,
    window: &CrawlWindow,
    today: NaiveDate,
    strategy: FetchStrategy,
) -> Result<Vec<ArticleRecord>, NewsError> {
    let mut collector = Collector::new(window, today);

    let pages_requested = match strategy {
        FetchStrategy::Sequential => {
            let mut requested = 0;
            for page in 1..=window.max_pages {
                let markup = source.fetch_page(page).await?;
                requested += 1;
                let rows = parse_page(&markup, source.origin());
                if collector.absorb(page, rows) != PageOutcome::Continue {
                    break;
                }
            }
            requested
        }
        FetchStrategy::Concurrent => {
            let pages = try_join_all((1..=window.max_pages).map(|page| source.fetch_page(page))).await?;
            for (page, markup) in (1..).zip(pages.iter()) {
                let rows = parse_page(markup, source.origin());
                if collector.absorb(page, rows) != PageOutcome::Continue {
                    break;
                }
            }
            window.max_pages
        }
    };

    info!(
        pages_requested,
        count = collector.records.len(),
        "Crawl complete"
    );
    Ok(collector.records)
}
