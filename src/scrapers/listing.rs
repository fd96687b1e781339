//! HTTP transport for the Naver Finance company news listing.
//!
//! # URL Pattern
//!
//! `{origin}/item/news_news.nhn?code={code}&page={page}`. The endpoint is the
//! frame behind the company news tab and expects a `Referer` from that tab.
//! Responses are EUC-KR; `reqwest` decodes them from the response charset.

use crate::config::Settings;
use crate::error::NewsError;
use crate::scrapers::PageSource;
use reqwest::Client;
use reqwest::header::REFERER;
use tracing::{debug, instrument};
use url::Url;

/// Listing pages of one company on one origin.
#[derive(Debug, Clone)]
pub struct NaverListing {
    client: Client,
    origin: Url,
    code: String,
}

impl NaverListing {
    pub fn new(settings: &Settings, code: &str) -> Result<Self, NewsError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            client,
            origin: Url::parse(&settings.origin)?,
            code: code.to_string(),
        })
    }

    fn base(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }

    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}/item/news_news.nhn?code={}&page={}",
            self.base(),
            urlencoding::encode(&self.code),
            page
        )
    }

    fn referer(&self) -> String {
        format!(
            "{}/item/news.naver?code={}",
            self.base(),
            urlencoding::encode(&self.code)
        )
    }
}

impl PageSource for NaverListing {
    fn origin(&self) -> &Url {
        &self.origin
    }

    #[instrument(level = "info", skip(self), fields(code = %self.code))]
    async fn fetch_page(&self, page: u32) -> Result<String, NewsError> {
        let url = self.page_url(page);
        let resp = self
            .client
            .get(&url)
            .header(REFERER, self.referer())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text().await?;
        debug!(bytes = body.len(), %url, "Fetched listing page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        let listing = NaverListing::new(&Settings::default(), "005930").unwrap();
        assert_eq!(
            listing.page_url(3),
            "https://finance.naver.com/item/news_news.nhn?code=005930&page=3"
        );
        assert_eq!(listing.origin().as_str(), "https://finance.naver.com/");
    }

    #[test]
    fn test_code_is_encoded() {
        let listing = NaverListing::new(&Settings::default(), "a b&c").unwrap();
        assert!(listing.page_url(1).contains("code=a%20b%26c&page=1"));
    }

    #[test]
    fn test_origin_trailing_slash_is_ignored() {
        let settings = Settings {
            origin: "http://127.0.0.1:9000/".to_string(),
            ..Settings::default()
        };
        let listing = NaverListing::new(&settings, "000660").unwrap();
        assert_eq!(
            listing.page_url(1),
            "http://127.0.0.1:9000/item/news_news.nhn?code=000660&page=1"
        );
        assert_eq!(
            listing.referer(),
            "http://127.0.0.1:9000/item/news.naver?code=000660"
        );
    }

    #[test]
    fn test_bad_origin_is_rejected() {
        let settings = Settings {
            origin: "not a url".to_string(),
            ..Settings::default()
        };
        let err = NaverListing::new(&settings, "000660").unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let settings = Settings {
            origin: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 2,
            ..Settings::default()
        };
        let listing = NaverListing::new(&settings, "000660").unwrap();
        let err = listing.fetch_page(1).await.unwrap_err();
        assert!(err.is_transport());
    }
}
