//! Article body scraper.
//!
//! Listing links point at Naver News article pages. The headline lives in
//! `div.media_end_head_title` and the body in `div.newsct_article._article_body`;
//! everything else on the page is navigation and ads.

use crate::error::NewsError;
use crate::models::ArticleRecord;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};

static CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.media_end_head_title, div.newsct_article._article_body").unwrap()
});

/// Fetch the body text of all records, one at a time, in record order.
///
/// Failed or empty fetches are logged and skipped without failing the batch.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub async fn fetch_articles(client: &Client, records: &[ArticleRecord]) -> Vec<String> {
    let bodies: Vec<String> = stream::iter(records)
        .then(|record| async move {
            match fetch_article(client, &record.link).await {
                Ok(Some(body)) => {
                    debug!(link = %record.link, chars = body.chars().count(), "Fetched article");
                    Some(body)
                }
                Ok(None) => {
                    warn!(link = %record.link, "Article page had no body");
                    None
                }
                Err(e) => {
                    error!(error = %e, link = %record.link, "Article fetch failed");
                    None
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = bodies.len(), "Fetched article contents");
    bodies
}

/// Fetch a single article page.
#[instrument(level = "debug", skip(client))]
async fn fetch_article(client: &Client, url: &str) -> Result<Option<String>, NewsError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(NewsError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let html = resp.text().await?;
    Ok(extract_body(&html))
}

/// Headline and body text of an article page, or `None` when neither exists.
pub fn extract_body(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let content = document
        .select(&CONTENT)
        .map(|element| element.text().collect::<String>().split_whitespace().join(" "))
        .filter(|text| !text.is_empty())
        .join("\n");
    (!content.is_empty()).then_some(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headline_and_body() {
        let html = r#"
<html><body>
  <nav>메뉴</nav>
  <div class="media_end_head_title"><h2>삼성전자, <span>1분기</span> 실적 발표</h2></div>
  <div class="ad">광고</div>
  <div class="newsct_article _article_body" id="dic_area">
    삼성전자가 1분기 잠정 실적을 발표했다.<br>
    영업이익은 전년 대비 감소했다.
  </div>
</body></html>"#;
        let body = extract_body(html).unwrap();
        assert_eq!(
            body,
            "삼성전자, 1분기 실적 발표\n삼성전자가 1분기 잠정 실적을 발표했다. 영업이익은 전년 대비 감소했다."
        );
        assert!(!body.contains("광고"));
    }

    #[test]
    fn test_page_without_article_is_none() {
        assert!(extract_body("<html><body><p>404</p></body></html>").is_none());
        assert!(extract_body(r#"<div class="newsct_article _article_body">  </div>"#).is_none());
    }
}
