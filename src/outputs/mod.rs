//! Report writers.
//!
//! # Submodules
//!
//! - [`json`]: writes the [`NewsReport`](crate::models::NewsReport) as JSON
//! - [`markdown`]: renders the report as a readable Markdown page
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 005930/
//!     └── 2023.05.01_2023.05.03.json
//!
//! markdown_output_dir/
//! └── 005930_2023.05.01_2023.05.03.md
//! ```

pub mod json;
pub mod markdown;

use crate::models::NewsReport;

/// `{from}_{to}` with `open` standing in for a missing bound.
pub fn window_stem(report: &NewsReport) -> String {
    format!(
        "{}_{}",
        report.date_from.as_deref().unwrap_or("open"),
        report.date_to.as_deref().unwrap_or("open")
    )
}
