//! JSON envelopes shared by the mock API and its clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Single-record envelope: `{ "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// A page of records plus the information needed to derive pagination.
///
/// `total` counts every record that matched the filters before the page
/// was sliced out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        Self {
            data,
            total,
            page,
            limit,
        }
    }

    /// Number of pages needed to show `total` records at `limit` per page.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.limit)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// `ceil(total / per_page)`; zero when there is nothing to show.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(u64::from(per_page)) as u32
}

/// Error body: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(8, 3), 3);
        assert_eq!(total_pages(9, 3), 3);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_has_next_page() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 8, 2, 3);
        assert!(page.has_next_page());
        let last = PaginatedResponse::new(vec![7, 8], 8, 3, 3);
        assert!(!last.has_next_page());
    }

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::new("Distribution not found")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Distribution not found" }));
    }
}
