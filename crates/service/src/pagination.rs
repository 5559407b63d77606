//! Pagination utilities for service layer
//!
//! Page size is fixed; only the 1-based page index comes from the caller.

use serde::{Deserialize, Serialize};

/// Items per page for catalog listings.
pub const PAGE_SIZE: usize = 20;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: usize,
    /// items per page
    pub per_page: usize,
}

impl Pagination {
    /// Build from the raw `page` query value. Only the leading integer is
    /// read (`"2abc"` and `"2.7"` are page 2). Missing, non-numeric or
    /// non-positive values select the first page.
    pub fn from_query(raw: Option<&str>) -> Self {
        let page = raw
            .and_then(leading_int)
            .filter(|p| *p > 0)
            .map(|p| usize::try_from(p).unwrap_or(usize::MAX))
            .unwrap_or(1);
        Self { page, per_page: PAGE_SIZE }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Optional sign followed by digits at the start of `raw`, after leading
/// whitespace. Saturates instead of overflowing.
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = digits[..len]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -value } else { value })
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: PAGE_SIZE }
    }
}

/// Pagination block of a listing response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub limit: usize,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total_count: usize) -> Self {
        Self {
            current_page: pagination.page,
            total_pages: total_count.div_ceil(pagination.per_page),
            total_count,
            limit: pagination.per_page,
        }
    }
}

/// One page of items plus its pagination block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}
