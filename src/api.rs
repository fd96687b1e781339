//! LLM access with exponential backoff retry logic.
//!
//! The similarity judge and the analyzer talk to an OpenAI-compatible
//! endpoint through `awful_aj`. Every call goes through the [`AskAsync`]
//! trait so that the retry decorator and test doubles can be slotted in.
//!
//! - [`AskAsync`]: one prompt in, one response out
//! - [`AskFnWrapper`]: binds `awful_aj::api::ask` to a config and a template
//! - [`RetryAsk`]: adds backoff with jitter to any [`AskAsync`]
//!
//! # Retry Strategy
//!
//! - Exponential backoff from `base_delay`, doubled per attempt
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::error::NewsError;
use awful_aj::api::ask;
use awful_aj::{config, config_dir, template};
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use itertools::Itertools;
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Chat models accepted by `--model`.
pub const AVAILABLE_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-2024-05-13",
    "gpt-4o-2024-08-06",
    "gpt-4o-mini",
    "gpt-4o-mini-2024-07-18",
    "gpt-4-turbo",
    "gpt-4-turbo-2024-04-09",
    "gpt-4-turbo-preview",
    "gpt-4-0125-preview",
    "gpt-4-1106-preview",
    "gpt-4",
    "gpt-4-0613",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-0125",
    "gpt-3.5-turbo-1106",
    "gpt-3.5-turbo-16k",
];

/// Retries per similarity verdict. A failed verdict goes straight to the
/// judge failure policy.
pub const JUDGE_MAX_RETRIES: usize = 0;

/// Trait for async LLM interaction.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// ```ignore
    /// let client = AskFnWrapper { config: &config, template: &template };
    /// let retry_client = RetryAsk::new(client, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Wrapper around `awful_aj::api::ask` that implements [`AskAsync`].
#[derive(Debug)]
pub struct AskFnWrapper<'a> {
    /// LLM configuration (API key, endpoint, model).
    pub config: &'a AwfulJadeConfig,
    /// Chat template holding the task's system prompt.
    pub template: &'a ChatTemplate,
}

impl<'a> AskAsync for AskFnWrapper<'a> {
    type Response = String;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = ask(self.config, text.to_string(), self.template, None, None).await;
        let dt = t0.elapsed();

        if let Err(e) = &res {
            warn!(elapsed_ms = dt.as_millis(), error = %e, "API call failed");
        }
        res
    }
}

/// Build the retrying client used for one task.
pub fn client<'a>(
    config: &'a AwfulJadeConfig,
    template: &'a ChatTemplate,
    max_retries: usize,
) -> RetryAsk<AskFnWrapper<'a>> {
    RetryAsk::new(
        AskFnWrapper { config, template },
        max_retries,
        StdDuration::from_secs(1),
    )
}

/// Reject model names outside [`AVAILABLE_MODELS`].
pub fn validate_model(name: &str) -> Result<(), NewsError> {
    if AVAILABLE_MODELS.contains(&name) {
        Ok(())
    } else {
        Err(NewsError::UnknownModel {
            name: name.to_string(),
            available: AVAILABLE_MODELS.iter().sorted().join(", "),
        })
    }
}

/// Load the `awful_aj` configuration, from `path` or from its config dir,
/// applying a model override when one was given.
#[instrument(level = "info")]
pub fn load_llm_config(
    path: Option<&str>,
    model: Option<&str>,
) -> Result<AwfulJadeConfig, NewsError> {
    let conf_file = match path {
        Some(p) => PathBuf::from(p),
        None => config_dir()
            .map_err(|e| NewsError::Llm(e.to_string()))?
            .join("config.yaml"),
    };
    let config_path = conf_file.to_string_lossy();
    let mut conf =
        config::load_config(&config_path).map_err(|e| NewsError::Llm(e.to_string()))?;
    if let Some(m) = model {
        conf.model = m.to_string();
    }
    info!(%config_path, model = %conf.model, "Loaded LLM configuration");
    Ok(conf)
}

/// Load a named chat template from the `awful_aj` templates directory.
#[instrument(level = "info")]
pub async fn load_chat_template(name: &str) -> Result<ChatTemplate, NewsError> {
    let t = template::load_template(name)
        .await
        .map_err(|e| NewsError::Llm(format!("template '{name}': {e}")))?;
    info!(template = name, "Loaded chat template");
    Ok(t)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted answers; `Err` entries become ask failures.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedAsk {
        pub answers: Mutex<VecDeque<Result<String, String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedAsk {
        pub fn new(answers: Vec<Result<&str, &str>>) -> Self {
            Self {
                answers: Mutex::new(
                    answers
                        .into_iter()
                        .map(|a| a.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::default(),
            }
        }
    }

    impl AskAsync for ScriptedAsk {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.prompts.lock().unwrap().push(text.to_string());
            match self.answers.lock().unwrap().pop_front() {
                Some(Ok(a)) => Ok(a),
                Some(Err(e)) => Err(e.into()),
                None => Err("no scripted answer left".into()),
            }
        }
    }

    #[derive(Debug, Default)]
    struct FlakyAsk {
        failures_left: Cell<usize>,
        calls: Cell<usize>,
    }

    impl AskAsync for FlakyAsk {
        type Response = String;

        async fn ask(&self, _text: &str) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err("503 from upstream".into());
            }
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let flaky = FlakyAsk {
            failures_left: Cell::new(2),
            calls: Cell::new(0),
        };
        let retry = RetryAsk::new(flaky, 3, StdDuration::from_millis(1));
        let res = retry.ask("hello").await.unwrap();
        assert_eq!(res, "ok");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let flaky = FlakyAsk {
            failures_left: Cell::new(10),
            calls: Cell::new(0),
        };
        let retry = RetryAsk::new(flaky, 1, StdDuration::from_millis(1));
        assert!(retry.ask("hello").await.is_err());
        assert_eq!(retry.inner.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_judge_client_does_not_retry() {
        let flaky = FlakyAsk {
            failures_left: Cell::new(1),
            calls: Cell::new(0),
        };
        let retry = RetryAsk::new(flaky, JUDGE_MAX_RETRIES, StdDuration::from_secs(1));
        let t0 = Instant::now();
        assert!(retry.ask("제목 1: a\n제목 2: b").await.is_err());
        assert_eq!(retry.inner.calls.get(), 1);
        assert!(t0.elapsed() < StdDuration::from_secs(1));
    }

    #[tokio::test]
    async fn test_scripted_ask_replays_in_order() {
        let s = ScriptedAsk::new(vec![Ok("first"), Err("boom")]);
        assert_eq!(s.ask("a").await.unwrap(), "first");
        assert!(s.ask("b").await.is_err());
        assert!(s.ask("c").await.is_err());
        assert_eq!(s.prompts.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_validate_model() {
        assert!(validate_model("gpt-4o-mini").is_ok());
        let err = validate_model("llama-9000").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("gpt-4o"));
    }

    #[test]
    fn test_retry_debug_hides_inner() {
        let retry = RetryAsk::new(FlakyAsk::default(), 5, StdDuration::from_secs(1));
        let dbg = format!("{retry:?}");
        assert!(dbg.contains("max_retries: 5"));
    }
}
