//! Listing page parser.
//!
//! A listing page is a `table.type5` with one `tr` per article:
//!
//! ```html
//! <tr class="first">
//!   <td class="title"><a href="/item/news_read.naver?article_id=...">제목</a></td>
//!   <td class="info">연합뉴스</td>
//!   <td class="date">2023.05.03 14:10</td>
//! </tr>
//! ```
//!
//! Stories with follow-ups are grouped under a `tr.relation_lst` holding a
//! nested table of related articles. That block, and every row inside it, is
//! excluded.

use crate::models::{ArticleRecord, LISTING_DATETIME_FORMAT};
use chrono::NaiveDateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

const RELATED_ROW_CLASS: &str = "relation_lst";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("table.type5 tr").unwrap());
static DATE: Lazy<Selector> = Lazy::new(|| Selector::parse(".date").unwrap());
static INFO: Lazy<Selector> = Lazy::new(|| Selector::parse(".info").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".title").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// One valid listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub published_at: NaiveDateTime,
    pub source: String,
    pub title: String,
    /// Absolute URL.
    pub link: String,
}

impl From<RawRow> for ArticleRecord {
    fn from(row: RawRow) -> Self {
        ArticleRecord::new(row.published_at, row.source, row.title, row.link)
    }
}

/// Extract the valid rows of one listing page, in page order.
pub fn parse_page(markup: &str, origin: &Url) -> Vec<RawRow> {
    let document = Html::parse_document(markup);
    document
        .select(&ROW)
        .filter(|row| !in_related_block(row))
        .filter_map(|row| parse_row(row, origin))
        .collect()
}

fn parse_row(row: ElementRef<'_>, origin: &Url) -> Option<RawRow> {
    let Some(date_cell) = row.select(&DATE).next() else {
        debug!("Row without date cell");
        return None;
    };
    let date_text = cell_text(date_cell);
    let source = row.select(&INFO).next().map(cell_text).unwrap_or_default();

    let Some(title_cell) = row.select(&TITLE).next() else {
        debug!(date = %date_text, "Row without title cell");
        return None;
    };
    let title = cell_text(title_cell);
    if title.is_empty() {
        debug!(date = %date_text, "Row with blank title");
        return None;
    }

    let href = title_cell
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|h| !h.is_empty());
    let Some(href) = href else {
        debug!(%title, "Title cell without link");
        return None;
    };
    let link = match origin.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!(%href, error = %e, "Unresolvable article link");
            return None;
        }
    };

    let published_at = match NaiveDateTime::parse_from_str(&date_text, LISTING_DATETIME_FORMAT) {
        Ok(dt) => dt,
        Err(_) => {
            debug!(date = %date_text, "Unparseable row date");
            return None;
        }
    };

    Some(RawRow {
        published_at,
        source,
        title,
        link,
    })
}

fn in_related_block(row: &ElementRef<'_>) -> bool {
    has_class(row, RELATED_ROW_CLASS)
        || row
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|e| has_class(&e, RELATED_ROW_CLASS))
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().split_whitespace().join(" ")
}
