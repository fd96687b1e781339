//! Data models for discovered articles, crawl bounds and the final report.
//!
//! - [`ArticleRecord`]: one listing row that survived parsing and filtering
//! - [`CrawlWindow`]: the date range and page cap of a crawl
//! - [`NewsReport`]: everything one invocation produces, written as JSON/Markdown

use crate::error::NewsError;
use crate::normalize::normalize_title;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Textual pattern of the listing's date cell.
pub const LISTING_DATETIME_FORMAT: &str = "%Y.%m.%d %H:%M";

/// Pattern accepted for date arguments on the command line.
pub const DATE_ARG_FORMAT: &str = "%Y.%m.%d";

/// A news item discovered on a listing page.
///
/// The `normalized_title` is derived from `title` at construction and is the
/// dedup key; it is never serialized and is rebuilt on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredArticle")]
pub struct ArticleRecord {
    /// Publication time as printed in the listing.
    #[serde(with = "listing_datetime")]
    pub published_at: NaiveDateTime,
    /// Publisher label; empty when the listing has none.
    pub source: String,
    /// Trimmed display title.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    #[serde(skip)]
    normalized_title: String,
}

impl ArticleRecord {
    pub fn new(
        published_at: NaiveDateTime,
        source: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        let title = title.into().trim().to_string();
        let normalized_title = normalize_title(&title);
        Self {
            published_at,
            source: source.into().trim().to_string(),
            title,
            link: link.into(),
            normalized_title,
        }
    }

    pub fn normalized_title(&self) -> &str {
        &self.normalized_title
    }

    pub fn published_date(&self) -> NaiveDate {
        self.published_at.date()
    }
}

/// Serialized shape of an [`ArticleRecord`].
#[derive(Deserialize)]
struct StoredArticle {
    #[serde(with = "listing_datetime")]
    published_at: NaiveDateTime,
    #[serde(default)]
    source: String,
    title: String,
    link: String,
}

impl From<StoredArticle> for ArticleRecord {
    fn from(stored: StoredArticle) -> Self {
        ArticleRecord::new(stored.published_at, stored.source, stored.title, stored.link)
    }
}

/// Date bounds (inclusive, each optional) and page cap of one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlWindow {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub max_pages: u32,
}

impl CrawlWindow {
    /// Build a window, rejecting `date_from > date_to`.
    pub fn new(
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        max_pages: u32,
    ) -> Result<Self, NewsError> {
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(NewsError::InvertedWindow {
                    from: from.format(DATE_ARG_FORMAT).to_string(),
                    to: to.format(DATE_ARG_FORMAT).to_string(),
                });
            }
        }
        Ok(Self {
            date_from,
            date_to,
            max_pages: max_pages.max(1),
        })
    }

    /// `true` when `date` lies inside both supplied bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from.is_none_or(|from| date >= from) && self.date_to.is_none_or(|to| date <= to)
    }
}

/// Parse a `YYYY.MM.DD` argument.
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, NewsError> {
    NaiveDate::parse_from_str(value.trim(), DATE_ARG_FORMAT).map_err(|_| NewsError::InvalidDate {
        value: value.to_string(),
    })
}

/// The output of one invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsReport {
    /// Label the user asked for (name or code).
    pub company: String,
    /// Effective ticker code.
    pub code: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Local time the report was generated, RFC 3339.
    pub generated_at: String,
    pub articles: Vec<ArticleRecord>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
}

mod listing_datetime {
    use super::LISTING_DATETIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(LISTING_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, LISTING_DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, LISTING_DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_article_record_trims_and_normalizes() {
        let rec = ArticleRecord::new(
            at("2023.05.01 09:30"),
            " 연합뉴스 ",
            "  삼성전자 실적 발표 [종합] ",
            "https://finance.naver.com/item/news_read.naver?article_id=1",
        );
        assert_eq!(rec.title, "삼성전자 실적 발표 [종합]");
        assert_eq!(rec.source, "연합뉴스");
        assert_eq!(rec.normalized_title(), "삼성전자 실적 발표");
        assert_eq!(rec.published_date(), NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    }

    #[test]
    fn test_article_record_serialization_hides_key() {
        let rec = ArticleRecord::new(at("2023.05.01 09:30"), "", "Title A", "https://x/1");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"published_at\":\"2023.05.01 09:30\""));
        assert!(!json.contains("normalized_title"));
    }

    #[test]
    fn test_deserialized_record_keeps_dedup_key() {
        let rec = ArticleRecord::new(
            at("2023.05.02 14:10"),
            "뉴스1",
            "(속보) SK하이닉스 신고가…",
            "https://finance.naver.com/n/2",
        );
        let json = serde_json::to_string(&rec).unwrap();
        let back: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.normalized_title(), "SK하이닉스 신고가");
        assert_eq!(back, rec);
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let from = parse_date_arg("2023.05.03").unwrap();
        let to = parse_date_arg("2023.05.01").unwrap();
        let err = CrawlWindow::new(Some(from), Some(to), 1).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_window_contains_inclusive_bounds() {
        let from = parse_date_arg("2023.05.01").unwrap();
        let to = parse_date_arg("2023.05.03").unwrap();
        let w = CrawlWindow::new(Some(from), Some(to), 3).unwrap();
        assert!(w.contains(from));
        assert!(w.contains(to));
        assert!(!w.contains(parse_date_arg("2023.04.30").unwrap()));
        assert!(!w.contains(parse_date_arg("2023.05.04").unwrap()));
    }

    #[test]
    fn test_open_window_contains_everything() {
        let w = CrawlWindow::new(None, None, 0).unwrap();
        assert_eq!(w.max_pages, 1);
        assert!(w.contains(parse_date_arg("1999.01.01").unwrap()));
    }

    #[test]
    fn test_parse_date_arg_rejects_dashes() {
        assert!(parse_date_arg("2023-05-01").is_err());
        assert!(parse_date_arg("2023.13.01").is_err());
        assert!(parse_date_arg("2023.05.01").is_ok());
    }
}
