//! Title normalization for exact-match deduplication.
//!
//! Listing titles carry presentation noise that differs between copies of
//! the same story: bracketed desk tags (`[종합]`, `(속보)`), and truncation
//! ellipses. The normalized form is only ever used as a dedup key; the
//! trimmed display title is what reaches the report.

use once_cell::sync::Lazy;
use regex::Regex;

/// Innermost bracket group; stripped repeatedly so nested groups go too.
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\[\]]*\]|\([^()]*\)").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Produce the comparison key for a listing title.
///
/// Removes `[...]` and `(...)` segments, the `…` glyph and literal `...`,
/// collapses whitespace runs and trims.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_title("삼성전자 실적 발표 [종합]"), "삼성전자 실적 발표");
/// assert_eq!(normalize_title("반도체 수출 회복…"), "반도체 수출 회복");
/// ```
pub fn normalize_title(title: &str) -> String {
    let mut stripped = title.to_string();
    while BRACKETED.is_match(&stripped) {
        stripped = BRACKETED.replace_all(&stripped, " ").into_owned();
    }
    let stripped = stripped.replace('…', "").replace("...", "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bracket_tags() {
        assert_eq!(normalize_title("삼성전자 실적 발표 [종합]"), "삼성전자 실적 발표");
        assert_eq!(normalize_title("[속보] 삼성전자 실적 발표"), "삼성전자 실적 발표");
        assert_eq!(normalize_title("SK하이닉스(000660) 신고가"), "SK하이닉스 신고가");
    }

    #[test]
    fn test_strips_nested_brackets() {
        assert_eq!(normalize_title("[a [b] c] 제목"), "제목");
        assert_eq!(normalize_title("제목 (사진 (1)) 끝"), "제목 끝");
    }

    #[test]
    fn test_unbalanced_bracket_is_kept() {
        assert_eq!(normalize_title("제목] [종합"), "제목] [종합");
    }

    #[test]
    fn test_strips_ellipses() {
        assert_eq!(normalize_title("반도체 수출 회복…"), "반도체 수출 회복");
        assert_eq!(normalize_title("반도체 수출 회복..."), "반도체 수출 회복");
    }

    #[test]
    fn test_collapses_inner_whitespace() {
        assert_eq!(normalize_title("  A  [tag]  B  "), "A B");
    }

    #[test]
    fn test_plain_title_is_only_trimmed() {
        assert_eq!(normalize_title("  Title A "), "Title A");
    }

    #[test]
    fn test_bracket_only_title_is_empty() {
        assert_eq!(normalize_title("[포토]"), "");
    }
}
