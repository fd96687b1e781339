//! Near-duplicate removal by pairwise title judgment.
//!
//! Exact dedup in the crawler catches reposts that differ only in tags and
//! ellipses. Different outlets covering the same event still slip through
//! with different wording, so each remaining title is compared against every
//! title already kept, and dropped on the first "same story" verdict.
//!
//! # Cost
//!
//! Up to `n * (n - 1) / 2` judge calls for `n` records. Fine for one
//! company's news over a few pages, not for bulk corpora. Each decision
//! depends on all earlier ones, so the pass runs sequentially.

use crate::api::AskAsync;
use crate::error::NewsError;
use crate::models::ArticleRecord;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// A same-story oracle for two headlines. Verdicts may be noisy and are not
/// assumed stable across runs.
pub trait SimilarityJudge {
    async fn are_similar(&self, a: &str, b: &str) -> Result<bool, NewsError>;
}

/// What a judge failure counts as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeFailurePolicy {
    /// A failed comparison counts as "not similar"; the candidate survives.
    #[default]
    FailOpen,
    /// A failed comparison counts as "similar"; the candidate is dropped.
    FailClosed,
}

impl JudgeFailurePolicy {
    fn verdict_on_error(self) -> bool {
        match self {
            JudgeFailurePolicy::FailOpen => false,
            JudgeFailurePolicy::FailClosed => true,
        }
    }
}

/// Keep the records, in order, whose titles no earlier kept record's title
/// is judged similar to.
#[instrument(level = "info", skip_all, fields(count = records.len(), policy = ?policy))]
pub async fn filter_similar<J: SimilarityJudge>(
    records: Vec<ArticleRecord>,
    judge: &J,
    policy: JudgeFailurePolicy,
) -> Vec<ArticleRecord> {
    let input = records.len();
    let mut kept: Vec<ArticleRecord> = Vec::with_capacity(input);
    let mut judge_calls = 0usize;
    let mut judge_errors = 0usize;

    'candidates: for candidate in records {
        for existing in &kept {
            judge_calls += 1;
            let similar = match judge.are_similar(&candidate.title, &existing.title).await {
                Ok(v) => v,
                Err(e) => {
                    judge_errors += 1;
                    let verdict = policy.verdict_on_error();
                    warn!(
                        error = %e,
                        candidate = %candidate.title,
                        existing = %existing.title,
                        similar = verdict,
                        "Judge failed; applying failure policy"
                    );
                    verdict
                }
            };
            if similar {
                debug!(dropped = %candidate.title, kept = %existing.title, "Dropping near-duplicate");
                continue 'candidates;
            }
        }
        kept.push(candidate);
    }

    info!(
        input,
        kept = kept.len(),
        judge_calls,
        judge_errors,
        "Similarity filter complete"
    );
    kept
}

/// A judge backed by a chat model answering `유사` (same) or `다름` (different).
#[derive(Debug)]
pub struct LlmJudge<A> {
    asker: A,
}

impl<A> LlmJudge<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(asker: A) -> Self {
        Self { asker }
    }
}

impl<A> SimilarityJudge for LlmJudge<A>
where
    A: AskAsync<Response = String>,
{
    async fn are_similar(&self, a: &str, b: &str) -> Result<bool, NewsError> {
        let answer = self
            .asker
            .ask(&similarity_prompt(a, b))
            .await
            .map_err(|e| NewsError::Judge(e.to_string()))?;
        parse_verdict(&answer).ok_or_else(|| {
            NewsError::Judge(format!(
                "unrecognized verdict '{}'",
                truncate_for_log(answer.trim(), 80)
            ))
        })
    }
}

pub fn similarity_prompt(a: &str, b: &str) -> String {
    format!(
        "다음 두 뉴스 제목이 같은 내용을 다루고 있는지 판단해주세요.\n\n\
         제목 1: {a}\n\
         제목 2: {b}\n\n\
         두 제목이 같은 내용을 다루고 있다면 \"유사\", 그렇지 않다면 \"다름\"이라고만 답변해주세요."
    )
}

/// Read a model answer. Only the bare verdict word counts; anything longer
/// (including negated forms such as `유사하지 않음`) is `None`.
pub fn parse_verdict(answer: &str) -> Option<bool> {
    let answer = answer
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace())
        .to_lowercase();
    match answer.as_str() {
        "유사" | "similar" | "same" => Some(true),
        "다름" | "different" => Some(false),
        _ => None,
    }
}
