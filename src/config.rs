//! Crawler and pipeline settings.
//!
//! Settings are read from an optional YAML file; every field has a default so
//! an absent file, or a file that sets only a few keys, is valid. The LLM
//! endpoint and model live in the separate `awful_aj` `config.yaml`.
//!
//! ```yaml
//! origin: https://finance.naver.com
//! request_timeout_secs: 10
//! max_pages: 3
//! fetch_strategy: concurrent
//! judge_failure_policy: fail_open
//! log:
//!   level: debug
//! ```

use crate::crawler::FetchStrategy;
use crate::error::NewsError;
use crate::similarity::JudgeFailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_ORIGIN: &str = "https://finance.naver.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scheme and host of the listing site; relative links are joined onto it.
    pub origin: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Page cap used when the command line does not give one.
    pub max_pages: u32,
    pub fetch_strategy: FetchStrategy,
    pub judge_failure_policy: JudgeFailurePolicy,
    /// Chunk size, in characters, for the map step of summarization.
    pub summary_chunk_chars: usize,
    pub templates: TemplateNames,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            user_agent: concat!("stock_news_digest/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 10,
            max_pages: 1,
            fetch_strategy: FetchStrategy::Sequential,
            judge_failure_policy: JudgeFailurePolicy::FailOpen,
            summary_chunk_chars: 1000,
            templates: TemplateNames::default(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load settings from `path`, or return the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, NewsError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, NewsError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_yaml(&raw)?;
        info!(path = %path.as_ref().display(), "Loaded settings");
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, NewsError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Names of the `awful_aj` chat templates used for each LLM task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateNames {
    pub similarity: String,
    pub summary: String,
    pub combine: String,
    pub sentiment: String,
}

impl Default for TemplateNames {
    fn default() -> Self {
        Self {
            similarity: "news_similarity".to_string(),
            summary: "news_summary".to_string(),
            combine: "news_summary_combine".to_string(),
            sentiment: "news_sentiment".to_string(),
        }
    }
}

/// Log output settings, applied once at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub with_target: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
        }
    }
}
