//! Pagination parameters shared by list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::infra::Query;

/// `entriesPerPage` / `currentPage` query parameters (1-indexed pages)
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default = "default_per_page")]
    pub entries_per_page: u64,
    #[serde(default = "default_page")]
    pub current_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PageParams {
    /// Rows to skip
    pub fn offset(&self) -> u64 {
        self.current_page.saturating_sub(1).saturating_mul(self.limit())
    }

    /// Page size, between 1 and the maximum
    pub fn limit(&self) -> u64 {
        self.entries_per_page.clamp(1, MAX_PAGE_SIZE)
    }

    /// Apply this page window to a query.
    pub fn apply(&self, query: Query) -> Query {
        query.range(self.offset(), self.limit())
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            entries_per_page: DEFAULT_PAGE_SIZE,
            current_page: DEFAULT_PAGE_NUMBER,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;

    use super::*;

    fn page(entries_per_page: u64, current_page: u64) -> PageParams {
        PageParams {
            entries_per_page,
            current_page,
        }
    }

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(PageParams::default().offset(), 0);
        assert_eq!(page(10, 3).offset(), 20);
        assert_eq!(page(10, 0).offset(), 0);
        assert_eq!(page(500, 2).limit(), MAX_PAGE_SIZE);
        assert_eq!(page(500, 2).offset(), MAX_PAGE_SIZE);
        assert_eq!(page(0, 1).limit(), 1);
    }

    #[test]
    fn test_huge_page_number_saturates() {
        assert_eq!(page(100, u64::MAX / 10).offset(), u64::MAX);
        assert_eq!(page(MAX_PAGE_SIZE, u64::MAX).offset(), u64::MAX);
    }

    #[test]
    fn test_deserializes_camel_case_strings() {
        let parse = |uri: &str| {
            let uri: Uri = uri.parse().unwrap();
            axum::extract::Query::<PageParams>::try_from_uri(&uri).unwrap().0
        };

        let params = parse("/items?entriesPerPage=25&currentPage=2");
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 25);

        let params = parse("/items?search=x");
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_apply_sets_range() {
        let query = page(5, 2).apply(Query::new());
        assert_eq!(query.range_window(), Some((5, 5)));
    }
}
