//! Summary and sentiment for the final article list.
//!
//! Summarization is map-reduce: article bodies are packed into chunks of at
//! most `chunk_chars` characters, each chunk is summarized on its own, and
//! the partial summaries are combined in one last call. The sentiment call
//! then reads only the combined summary.

use crate::api::AskAsync;
use crate::error::NewsError;
use tracing::{error, info, instrument};

/// Returned instead of a sentiment judgment when the model call fails.
pub const SENTIMENT_FALLBACK: &str = "감정 분석 실패";

#[derive(Debug, Clone)]
pub struct Analysis {
    pub summary: String,
    pub sentiment: String,
}

/// The three LLM tasks, each bound to its own prompt template.
#[derive(Debug)]
pub struct Analyzer<A> {
    pub summarizer: A,
    pub combiner: A,
    pub sentiment: A,
    pub chunk_chars: usize,
}

impl<A> Analyzer<A>
where
    A: AskAsync<Response = String>,
{
    #[instrument(level = "info", skip_all, fields(%company, articles = contents.len()))]
    pub async fn analyze(&self, company: &str, contents: &[String]) -> Result<Analysis, NewsError> {
        let summary = self.summarize(contents).await?;
        let sentiment = self.sentiment(company, &summary).await;
        Ok(Analysis { summary, sentiment })
    }

    /// Map-reduce summary of all contents.
    pub async fn summarize(&self, contents: &[String]) -> Result<String, NewsError> {
        let chunks = chunk_text(contents, self.chunk_chars);
        info!(chunks = chunks.len(), "Summarizing");

        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let partial = self
                .summarizer
                .ask(&summary_prompt(chunk))
                .await
                .map_err(|e| NewsError::Llm(e.to_string()))?;
            partials.push(partial.trim().to_string());
        }

        match partials.len() {
            0 => Ok(String::new()),
            1 => Ok(partials.remove(0)),
            _ => {
                let combined = self
                    .combiner
                    .ask(&combine_prompt(&partials.join("\n\n")))
                    .await
                    .map_err(|e| NewsError::Llm(e.to_string()))?;
                Ok(combined.trim().to_string())
            }
        }
    }

    /// Overall tone of the coverage. Never fails; a model error yields
    /// [`SENTIMENT_FALLBACK`].
    pub async fn sentiment(&self, company: &str, summary: &str) -> String {
        match self.sentiment.ask(&sentiment_prompt(company, summary)).await {
            Ok(s) => s.trim().to_string(),
            Err(e) => {
                error!(error = %e, %company, "Sentiment analysis failed");
                SENTIMENT_FALLBACK.to_string()
            }
        }
    }
}

/// Pack texts into chunks of at most `max_chars` characters.
///
/// Texts are split on paragraph breaks and paragraphs are packed greedily;
/// a paragraph longer than `max_chars` is cut at character boundaries.
pub fn chunk_text(texts: &[String], max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    let paragraphs = texts
        .iter()
        .flat_map(|t| t.split('\n'))
        .map(str::trim)
        .filter(|p| !p.is_empty());

    for paragraph in paragraphs {
        let chars: Vec<char> = paragraph.chars().collect();
        for piece in chars.chunks(max_chars) {
            let sep = usize::from(current_chars > 0);
            if current_chars + sep + piece.len() > max_chars && current_chars > 0 {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if current_chars > 0 {
                current.push('\n');
                current_chars += 1;
            }
            current.extend(piece);
            current_chars += piece.len();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn summary_prompt(text: &str) -> String {
    format!("다음 뉴스 내용을 간결하게 요약해줘:\n\n\"{text}\"\n\n간결한 요약:")
}

fn combine_prompt(partials: &str) -> String {
    format!("아래 요약들을 하나의 간결한 요약으로 작성해줘:\n\n\"{partials}\"\n\n간결한 요약:")
}

fn sentiment_prompt(company: &str, summary: &str) -> String {
    format!(
        "다음은 {company}에 관한 여러 뉴스의 종합 요약입니다:\n\n{summary}\n\n\
         이 요약을 바탕으로 {company}에 대한 전반적인 뉴스 논조가 긍정적인지, 부정적인지, \
         중립적인지 판단하고, 그 이유를 간단히 설명해주세요. 또한, 가장 중요해 보이는 \
         3가지 핵심 포인트를 추출하여 나열해주세요."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::ScriptedAsk;

    fn analyzer(
        summarizer: Vec<Result<&str, &str>>,
        combiner: Vec<Result<&str, &str>>,
        sentiment: Vec<Result<&str, &str>>,
        chunk_chars: usize,
    ) -> Analyzer<ScriptedAsk> {
        Analyzer {
            summarizer: ScriptedAsk::new(summarizer),
            combiner: ScriptedAsk::new(combiner),
            sentiment: ScriptedAsk::new(sentiment),
            chunk_chars,
        }
    }

    #[test]
    fn test_chunk_text_packs_paragraphs() {
        let texts = vec!["aaa\nbbb".to_string(), "cc".to_string()];
        assert_eq!(chunk_text(&texts, 7), vec!["aaa\nbbb", "cc"]);
        assert_eq!(chunk_text(&texts, 100), vec!["aaa\nbbb\ncc"]);
    }

    #[test]
    fn test_chunk_text_splits_long_paragraph_by_chars() {
        let texts = vec!["가나다라마바".to_string()];
        assert_eq!(chunk_text(&texts, 4), vec!["가나다라", "마바"]);
    }

    #[test]
    fn test_chunk_text_respects_limit() {
        let texts = vec!["x".repeat(2500), "y".repeat(10)];
        let chunks = chunk_text(&texts, 1000);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
        let total: usize = chunks.iter().map(|c| c.replace('\n', "").len()).sum();
        assert_eq!(total, 2510);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text(&[], 1000).is_empty());
        assert!(chunk_text(&["  \n ".to_string()], 1000).is_empty());
    }

    #[tokio::test]
    async fn test_single_chunk_skips_combine() {
        let a = analyzer(vec![Ok(" 요약 ")], vec![], vec![Ok("긍정적")], 1000);
        let out = a.analyze("삼성전자", &["본문".to_string()]).await.unwrap();
        assert_eq!(out.summary, "요약");
        assert_eq!(out.sentiment, "긍정적");
        assert!(a.combiner.prompts.lock().unwrap().is_empty());
        assert!(a.sentiment.prompts.lock().unwrap()[0].contains("삼성전자에 관한"));
    }

    #[tokio::test]
    async fn test_multiple_chunks_are_combined() {
        let a = analyzer(vec![Ok("s1"), Ok("s2")], vec![Ok("combined")], vec![Ok("중립")], 5);
        let out = a
            .analyze("SK하이닉스", &["aaaaa".to_string(), "bbbbb".to_string()])
            .await
            .unwrap();
        assert_eq!(out.summary, "combined");
        let combine_prompts = a.combiner.prompts.lock().unwrap();
        assert!(combine_prompts[0].contains("s1\n\ns2"));
    }

    #[tokio::test]
    async fn test_summary_failure_propagates() {
        let a = analyzer(vec![Err("rate limited")], vec![], vec![], 1000);
        let err = a.analyze("KT", &["본문".to_string()]).await.unwrap_err();
        assert!(matches!(err, NewsError::Llm(_)));
    }

    #[tokio::test]
    async fn test_sentiment_failure_falls_back() {
        let a = analyzer(vec![Ok("요약")], vec![], vec![Err("timeout")], 1000);
        let out = a.analyze("KT", &["본문".to_string()]).await.unwrap();
        assert_eq!(out.sentiment, SENTIMENT_FALLBACK);
    }
}
