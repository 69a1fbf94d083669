//! Pagination parameter normalization for the listing endpoint.
//!
//! Query parameters arrive as raw strings; anything unparseable falls
//! back to a default instead of failing the request.

/// First page when the client sends nothing usable.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size when the client sends nothing usable or a value below 1.
pub const DEFAULT_LIMIT: i64 = 5;

/// Hard ceiling on the page size.
pub const MAX_LIMIT: i64 = 10;

/// Normalize a raw `page` query value. Absent, non-numeric, or sub-1
/// values behave as page 1.
pub fn page_from_query(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.parse::<i64>().ok()) {
        Some(page) if page >= 1 => page,
        _ => DEFAULT_PAGE,
    }
}

/// Normalize a raw `limit` query value.
///
/// Absent, non-numeric, or sub-1 values behave as [`DEFAULT_LIMIT`];
/// anything above [`MAX_LIMIT`] is clamped down to it.
pub fn limit_from_query(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.parse::<i64>().ok()) {
        Some(limit) if limit >= 1 => limit.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Row offset of a 1-indexed page.
pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

/// Number of pages needed to hold `count` rows, `limit` per page.
pub fn total_pages(count: i64, limit: i64) -> i64 {
    (count as u64).div_ceil(limit as u64) as i64
}
