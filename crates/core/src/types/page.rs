//! 1-based page arithmetic shared by the local store and upstream queries.

use serde::{Deserialize, Serialize};

/// A bounded page request.
///
/// Pages are 1-based. A request is only bounded when both the page and the
/// page size are known; callers holding a partial pair should treat the
/// query as unbounded (see [`PageRequest::from_parts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Number of rows per page.
    pub page_size: u32,
}

impl PageRequest {
    /// Create a page request.
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Build a page request from optional parts.
    ///
    /// Returns `None` unless both parts are present, which callers treat as
    /// an unbounded select.
    #[must_use]
    pub const fn from_parts(page: Option<u32>, page_size: Option<u32>) -> Option<Self> {
        match (page, page_size) {
            (Some(page), Some(page_size)) => Some(Self { page, page_size }),
            _ => None,
        }
    }

    /// SQL `LIMIT` value.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET` value: `page * page_size - page_size`.
    ///
    /// Page 0 is treated as page 1.
    #[must_use]
    pub fn offset(&self) -> i64 {
        let size = i64::from(self.page_size);
        (i64::from(self.page) * size - size).max(0)
    }
}
