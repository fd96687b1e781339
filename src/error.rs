//! Error type shared by the crawler, the similarity filter and the analyzer.
//!
//! Errors fall into four groups:
//!
//! - **Validation**: bad user input, raised before any request is sent
//!   ([`NewsError::InvalidDate`], [`NewsError::InvertedWindow`],
//!   [`NewsError::UnknownCompany`], [`NewsError::MissingCompany`],
//!   [`NewsError::UnknownModel`]).
//! - **Transport**: a listing or article page could not be fetched. Fatal to
//!   the crawl.
//! - **Judge**: the similarity oracle failed. Absorbed by the filter's
//!   [`JudgeFailurePolicy`](crate::similarity::JudgeFailurePolicy).
//! - **Local**: settings, I/O and serialization failures.
//!
//! Malformed listing rows never produce an error; the parser skips them.

use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum NewsError {
    /// A date argument did not match `YYYY.MM.DD`.
    #[error("invalid date '{value}': expected YYYY.MM.DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// The start of the window is after its end.
    #[error("invalid date range: {from} is after {to}")]
    InvertedWindow { from: String, to: String },

    /// A company display name with no entry in the code table.
    #[error("unknown company name '{0}'; pass the ticker code instead")]
    UnknownCompany(String),

    /// Neither a code nor a name was given.
    #[error("a company code or name is required")]
    MissingCompany,

    /// The requested model is not in the supported list.
    #[error("model '{name}' is not available (available: {available})")]
    UnknownModel { name: String, available: String },

    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// A URL could not be built or joined.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The similarity oracle failed or returned an unusable answer.
    #[error("similarity judge failed: {0}")]
    Judge(String),

    /// A language-model request failed.
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// The settings file could not be parsed.
    #[error("settings error: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NewsError {
    /// True for errors caused by user input rather than by the network or
    /// the local environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            NewsError::InvalidDate { .. }
                | NewsError::InvertedWindow { .. }
                | NewsError::UnknownCompany(_)
                | NewsError::MissingCompany
                | NewsError::UnknownModel { .. }
        )
    }

    /// True for errors raised while fetching a page.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NewsError::Http(_) | NewsError::Status { .. } | NewsError::Url(_)
        )
    }
}
