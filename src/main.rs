//! # Stock News Digest
//!
//! Crawls the Naver Finance news listing of one listed company, keeps the
//! articles inside a date window, removes duplicates and near-duplicates, and
//! asks an OpenAI-compatible LLM for a summary and a sentiment judgment.
//!
//! ## Usage
//!
//! ```sh
//! stock_news_digest -c 삼성전자 -f 2023.05.01 -t 2023.05.07 -p 3 -j ./json -o ./markdown
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Validation**: company, dates and model are checked before any request
//! 2. **Crawling**: listing pages are fetched and parsed, filtered to the
//!    window and deduplicated by link and normalized title
//! 3. **Similarity**: an LLM judge drops headlines covering the same story
//! 4. **Analysis**: article bodies are fetched, summarized and judged for tone
//! 5. **Output**: console listing, plus optional JSON and Markdown reports

use chrono::Local;
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analyzer;
mod api;
mod cli;
mod companies;
mod config;
mod crawler;
mod error;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod similarity;
mod utils;

use analyzer::{Analysis, Analyzer};
use api::{load_chat_template, load_llm_config};
use cli::Cli;
use companies::CompanyQuery;
use config::{LogSettings, Settings};
use error::NewsError;
use models::{ArticleRecord, DATE_ARG_FORMAT, LISTING_DATETIME_FORMAT, NewsReport};
use outputs::{json, markdown};
use scrapers::article;
use scrapers::listing::NaverListing;
use similarity::{LlmJudge, filter_similar};
use utils::ensure_writable_dir;

const LLM_MAX_RETRIES: usize = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let settings = Settings::load(args.settings.as_deref())?;
    init_tracing(&settings.log);

    let start_time = std::time::Instant::now();
    info!("stock_news_digest starting up");
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = run(&args, &settings).await {
        match e.downcast_ref::<NewsError>() {
            Some(news_err) => error!(
                error = %news_err,
                validation = news_err.is_validation(),
                transport = news_err.is_transport(),
                "Run failed"
            ),
            None => error!(error = %e, "Run failed"),
        }
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the settings level.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(log.with_target)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

#[instrument(level = "info", skip_all, fields(company = %args.company))]
async fn run(args: &Cli, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let today = Local::now().date_naive();

    // ---- Validation: nothing below this block runs on bad input ----
    let query = CompanyQuery::parse(&args.company)?;
    let code = query.code()?;
    let window = args.window(today, settings.max_pages)?;
    let model = args.model()?;
    let strategy = args.strategy.unwrap_or(settings.fetch_strategy);
    info!(
        company = query.label(),
        %code,
        date_from = ?window.date_from,
        date_to = ?window.date_to,
        max_pages = window.max_pages,
        ?strategy,
        "Request validated"
    );

    for dir in [&args.json_output_dir, &args.markdown_output_dir]
        .into_iter()
        .flatten()
    {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let llm_config = if args.needs_llm() {
        Some(load_llm_config(args.config.as_deref(), model)?)
    } else {
        None
    };

    // ---- Crawl ----
    let listing = NaverListing::new(settings, &code)?;
    let mut records = crawler::crawl(&listing, &window, today, strategy).await?;

    // ---- Near-duplicate filter ----
    if let Some(conf) = llm_config.as_ref().filter(|_| !args.no_similarity) {
        if records.len() > 1 {
            let template = load_chat_template(&settings.templates.similarity).await?;
            let judge = LlmJudge::new(api::client(conf, &template, api::JUDGE_MAX_RETRIES));
            records = filter_similar(records, &judge, settings.judge_failure_policy).await;
        }
    }

    print_listing(&records);

    // ---- Summary & sentiment ----
    let analysis = match llm_config.as_ref() {
        Some(conf) if !args.links_only && !records.is_empty() => {
            analyze(conf, settings, query.label(), &records).await?
        }
        _ => None,
    };
    if let Some(a) = &analysis {
        println!("\n== Summary ==\n{}\n\n== Sentiment ==\n{}", a.summary, a.sentiment);
    }

    // ---- Reports ----
    let report = NewsReport {
        company: query.label().to_string(),
        code,
        date_from: window.date_from.map(|d| d.format(DATE_ARG_FORMAT).to_string()),
        date_to: window.date_to.map(|d| d.format(DATE_ARG_FORMAT).to_string()),
        generated_at: Local::now().to_rfc3339(),
        articles: records,
        summary: analysis.as_ref().map(|a| a.summary.clone()),
        sentiment: analysis.map(|a| a.sentiment),
    };

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_report(&report, dir).await {
            error!(error = %e, "Failed to write JSON report");
        }
    }
    if let Some(dir) = &args.markdown_output_dir {
        if let Err(e) = markdown::write_report(&report, dir).await {
            error!(path = %dir, error = %e, "Failed writing Markdown");
        }
    }

    Ok(())
}

/// Fetch article bodies and run summary + sentiment. `None` when no body
/// could be downloaded.
async fn analyze(
    conf: &awful_aj::config::AwfulJadeConfig,
    settings: &Settings,
    company: &str,
    records: &[ArticleRecord],
) -> Result<Option<Analysis>, NewsError> {
    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.request_timeout())
        .build()?;
    let contents = article::fetch_articles(&client, records).await;
    if contents.is_empty() {
        warn!("No article bodies could be fetched; skipping analysis");
        return Ok(None);
    }

    let summary_template = load_chat_template(&settings.templates.summary).await?;
    let combine_template = load_chat_template(&settings.templates.combine).await?;
    let sentiment_template = load_chat_template(&settings.templates.sentiment).await?;
    let analyzer = Analyzer {
        summarizer: api::client(conf, &summary_template, LLM_MAX_RETRIES),
        combiner: api::client(conf, &combine_template, LLM_MAX_RETRIES),
        sentiment: api::client(conf, &sentiment_template, LLM_MAX_RETRIES),
        chunk_chars: settings.summary_chunk_chars,
    };
    analyzer.analyze(company, &contents).await.map(Some)
}

fn print_listing(records: &[ArticleRecord]) {
    if records.is_empty() {
        println!("No news found.");
        return;
    }
    println!("Found {} articles:", records.len());
    for r in records {
        println!(
            "[{}] {} - {}",
            r.published_at.format(LISTING_DATETIME_FORMAT),
            r.title,
            r.link
        );
    }
}
