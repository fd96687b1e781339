//! Command-line interface definitions.
//!
//! Arguments are checked here before anything touches the network: dates
//! must be `YYYY.MM.DD`, the window must not be inverted and the model must
//! be one of the supported names.

use crate::api::validate_model;
use crate::crawler::FetchStrategy;
use crate::error::NewsError;
use crate::models::{CrawlWindow, parse_date_arg};
use chrono::NaiveDate;
use clap::Parser;

/// Crawl a company's Naver Finance news, drop duplicates and summarize them.
///
/// ```sh
/// # Today's news for Samsung Electronics, by name
/// stock_news_digest -c 삼성전자
///
/// # A week of SK hynix news, three pages, links only
/// stock_news_digest -c 000660 -f 2023.05.01 -t 2023.05.07 -p 3 --links-only
///
/// # Full analysis with a JSON report
/// stock_news_digest -c 005930 -m gpt-4o-mini -j ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Ticker code (e.g. 005930) or company name (e.g. 삼성전자)
    #[arg(short, long)]
    pub company: String,

    /// First day of the window, YYYY.MM.DD (default: today)
    #[arg(short = 'f', long)]
    pub date_from: Option<String>,

    /// Last day of the window, YYYY.MM.DD (default: today)
    #[arg(short = 't', long)]
    pub date_to: Option<String>,

    /// Maximum number of listing pages to request (default: from settings)
    #[arg(short = 'p', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// Chat model used for similarity, summary and sentiment
    #[arg(short, long, env = "NEWS_DIGEST_MODEL")]
    pub model: Option<String>,

    /// Page fetch strategy (default: from settings)
    #[arg(long, value_enum)]
    pub strategy: Option<FetchStrategy>,

    /// Skip the LLM near-duplicate filter
    #[arg(long)]
    pub no_similarity: bool,

    /// Stop after listing the articles; no summary or sentiment
    #[arg(long)]
    pub links_only: bool,

    /// Optional path to the crawler settings YAML
    #[arg(short, long, env = "NEWS_DIGEST_SETTINGS")]
    pub settings: Option<String>,

    /// Optional path to the awful_aj config.yaml
    #[arg(long)]
    pub config: Option<String>,

    /// Output directory for the JSON report
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown report
    #[arg(short = 'o', long)]
    pub markdown_output_dir: Option<String>,
}

impl Cli {
    /// Build the crawl window; missing dates default to `today`.
    pub fn window(&self, today: NaiveDate, default_max_pages: u32) -> Result<CrawlWindow, NewsError> {
        let date_from = match &self.date_from {
            Some(s) => parse_date_arg(s)?,
            None => today,
        };
        let date_to = match &self.date_to {
            Some(s) => parse_date_arg(s)?,
            None => today,
        };
        CrawlWindow::new(
            Some(date_from),
            Some(date_to),
            self.max_pages.unwrap_or(default_max_pages),
        )
    }

    /// Validate the model name, if one was given.
    pub fn model(&self) -> Result<Option<&str>, NewsError> {
        match self.model.as_deref() {
            Some(m) => validate_model(m).map(|_| Some(m)),
            None => Ok(None),
        }
    }

    /// Whether any LLM call will be made.
    pub fn needs_llm(&self) -> bool {
        !self.no_similarity || !self.links_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 10).unwrap()
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "stock_news_digest",
            "--company",
            "000660",
            "--date-from",
            "2023.05.01",
            "--date-to",
            "2023.05.31",
        ]);

        assert_eq!(cli.company, "000660");
        let w = cli.window(today(), 1).unwrap();
        assert_eq!(w.date_from, NaiveDate::from_ymd_opt(2023, 5, 1));
        assert_eq!(w.date_to, NaiveDate::from_ymd_opt(2023, 5, 31));
        assert_eq!(w.max_pages, 1);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "stock_news_digest",
            "-c",
            "삼성전자",
            "-p",
            "3",
            "-m",
            "gpt-4",
            "-j",
            "/tmp/json",
            "-o",
            "/tmp/markdown",
            "--strategy",
            "concurrent",
            "--links-only",
        ]);

        assert_eq!(cli.company, "삼성전자");
        assert_eq!(cli.max_pages, Some(3));
        assert_eq!(cli.model().unwrap(), Some("gpt-4"));
        assert_eq!(cli.strategy, Some(FetchStrategy::Concurrent));
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
        assert_eq!(cli.markdown_output_dir.as_deref(), Some("/tmp/markdown"));
        assert!(cli.links_only);
        assert!(cli.needs_llm());
    }

    #[test]
    fn test_dates_default_to_today() {
        let cli = Cli::parse_from(["stock_news_digest", "-c", "000660"]);
        let w = cli.window(today(), 2).unwrap();
        assert_eq!(w.date_from, Some(today()));
        assert_eq!(w.date_to, Some(today()));
        assert_eq!(w.max_pages, 2);
    }

    #[test]
    fn test_invalid_date_format_is_rejected() {
        let cli = Cli::parse_from(["stock_news_digest", "-c", "000660", "-f", "2023-05-01"]);
        let err = cli.window(today(), 1).unwrap_err();
        assert!(matches!(err, NewsError::InvalidDate { ref value } if value == "2023-05-01"));
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let cli = Cli::parse_from([
            "stock_news_digest",
            "-c",
            "000660",
            "-f",
            "2023.05.31",
            "-t",
            "2023.05.01",
        ]);
        assert!(cli.window(today(), 1).unwrap_err().is_validation());
    }

    #[test]
    fn test_zero_pages_is_rejected() {
        let res = Cli::try_parse_from(["stock_news_digest", "-c", "000660", "-p", "0"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let cli = Cli::parse_from(["stock_news_digest", "-c", "000660", "-m", "gpt-99"]);
        assert!(cli.model().unwrap_err().is_validation());
    }

    #[test]
    fn test_links_only_without_similarity_needs_no_llm() {
        let cli = Cli::parse_from([
            "stock_news_digest",
            "-c",
            "000660",
            "--links-only",
            "--no-similarity",
        ]);
        assert!(!cli.needs_llm());
    }
}
