//! Company name to ticker code resolution.
//!
//! Naver Finance addresses companies by their six-digit KRX code. Users may
//! pass either the code itself or one of the display names below.

use crate::error::NewsError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static COMPANY_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("삼성전자", "005930"),
        ("SK하이닉스", "000660"),
        ("LG에너지솔루션", "373220"),
        ("삼성바이오로직스", "207940"),
        ("현대차", "005380"),
        ("기아", "000270"),
        ("셀트리온", "068270"),
        ("NAVER", "035420"),
        ("카카오", "035720"),
        ("POSCO홀딩스", "005490"),
        ("LG화학", "051910"),
        ("삼성SDI", "006400"),
        ("KB금융", "105560"),
        ("신한지주", "055550"),
        ("하나금융지주", "086790"),
        ("현대모비스", "012330"),
        ("삼성물산", "028260"),
        ("LG전자", "066570"),
        ("SK이노베이션", "096770"),
        ("카카오뱅크", "323410"),
        ("한국전력", "015760"),
        ("SK텔레콤", "017670"),
        ("KT", "030200"),
        ("삼성생명", "032830"),
        ("포스코퓨처엠", "003670"),
        ("에코프로비엠", "247540"),
        ("에코프로", "086520"),
        ("HMM", "011200"),
        ("대한항공", "003490"),
        ("크래프톤", "259960"),
    ])
});

/// The lookup key a user supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyQuery {
    /// A literal ticker code.
    Code(String),
    /// A display name, resolved through the static table.
    Name(String),
}

impl CompanyQuery {
    /// Classify raw input: all ASCII digits is a code, anything else a name.
    pub fn parse(input: &str) -> Result<Self, NewsError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NewsError::MissingCompany);
        }
        if input.chars().all(|c| c.is_ascii_digit()) {
            Ok(CompanyQuery::Code(input.to_string()))
        } else {
            Ok(CompanyQuery::Name(input.to_string()))
        }
    }

    /// The effective ticker code.
    pub fn code(&self) -> Result<String, NewsError> {
        match self {
            CompanyQuery::Code(code) => Ok(code.clone()),
            CompanyQuery::Name(name) => lookup_code(name)
                .map(str::to_string)
                .ok_or_else(|| NewsError::UnknownCompany(name.clone())),
        }
    }

    /// The label used in logs, prompts and reports.
    pub fn label(&self) -> &str {
        match self {
            CompanyQuery::Code(s) | CompanyQuery::Name(s) => s,
        }
    }
}

pub fn lookup_code(name: &str) -> Option<&'static str> {
    COMPANY_CODES.get(name).copied()
}
