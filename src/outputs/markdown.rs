//! Markdown rendering of a [`NewsReport`].

use crate::models::{LISTING_DATETIME_FORMAT, NewsReport};
use crate::outputs::window_stem;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// Render the report as a Markdown page.
pub fn report_to_markdown(report: &NewsReport) -> String {
    let mut md = String::new();

    writeln!(md, "# {} ({}) news digest\n", report.company, report.code).unwrap();
    writeln!(
        md,
        "_Window: {} ~ {} · generated {}_\n",
        report.date_from.as_deref().unwrap_or("open"),
        report.date_to.as_deref().unwrap_or("open"),
        report.generated_at
    )
    .unwrap();

    if let Some(summary) = &report.summary {
        writeln!(md, "## Summary\n\n{}\n", summary.trim()).unwrap();
    }
    if let Some(sentiment) = &report.sentiment {
        writeln!(md, "## Sentiment\n\n{}\n", sentiment.trim()).unwrap();
    }

    writeln!(md, "## Articles ({})\n", report.articles.len()).unwrap();
    if report.articles.is_empty() {
        writeln!(md, "No articles found.").unwrap();
    }
    for article in &report.articles {
        let source = if article.source.is_empty() {
            String::new()
        } else {
            format!(" <small>`{}`</small>", article.source)
        };
        writeln!(
            md,
            "- {} [{}]({}){}",
            article.published_at.format(LISTING_DATETIME_FORMAT),
            article.title.replace('[', "\\[").replace(']', "\\]"),
            article.link,
            source
        )
        .unwrap();
    }

    md
}

/// Write the Markdown report and return the path written.
#[instrument(level = "info", skip_all, fields(%markdown_output_dir, code = %report.code))]
pub async fn write_report(
    report: &NewsReport,
    markdown_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let path = format!(
        "{}/{}_{}.md",
        markdown_output_dir.trim_end_matches('/'),
        report.code,
        window_stem(report)
    );
    fs::write(&path, report_to_markdown(report)).await?;
    info!(%path, "Wrote Markdown report");
    Ok(path)
}
