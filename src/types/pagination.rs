//! Pagination types for list endpoints.

use serde::Serialize;

use crate::config::{DEFAULT_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Largest row offset the database drivers accept (signed 64-bit).
const MAX_ROW_OFFSET: u64 = i64::MAX as u64;

/// Resolved page selection (1-indexed page, capped page size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Build from optional query values, falling back to `default_per_page`.
    ///
    /// The page number is clamped so the resulting row offset stays within
    /// what the database accepts.
    pub fn new(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> Self {
        let per_page = per_page
            .filter(|p| *p > 0)
            .unwrap_or(default_per_page)
            .clamp(1, MAX_PAGE_SIZE);
        let page = page
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PAGE_NUMBER)
            .min(MAX_ROW_OFFSET / per_page);

        Self { page, per_page }
    }

    /// Zero-based page index for SeaORM paginators
    pub fn index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}

/// Paginated list payload, field names match the mobile client's
/// expectations (`current_page`, `last_page`).
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let last_page = if request.per_page > 0 {
            total.div_ceil(request.per_page).max(1)
        } else {
            1
        };

        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let request = PageRequest::new(None, None, 6);
        assert_eq!(request, PageRequest { page: 1, per_page: 6 });
        assert_eq!(request.index(), 0);
    }

    #[test]
    fn test_page_request_caps_size() {
        let request = PageRequest::new(Some(3), Some(5_000), 15);
        assert_eq!(request.per_page, MAX_PAGE_SIZE);
        assert_eq!(request.index(), 2);
    }

    #[test]
    fn test_huge_page_keeps_offset_in_range() {
        let request = PageRequest::new(Some(u64::MAX), Some(100), 15);
        assert!(request.page < u64::MAX);
        assert!(request.index().checked_mul(request.per_page).is_some());
        assert!(request.page * request.per_page <= i64::MAX as u64);
    }

    #[test]
    fn test_zero_values_fall_back() {
        let request = PageRequest::new(Some(0), Some(0), 15);
        assert_eq!(request, PageRequest { page: 1, per_page: 15 });
    }

    #[test]
    fn test_last_page_rounds_up() {
        let page = Paginated::new(vec![1, 2, 3], PageRequest::new(Some(1), Some(3), 3), 7);
        assert_eq!(page.last_page, 3);

        let empty: Paginated<i32> = Paginated::new(vec![], PageRequest::new(None, None, 6), 0);
        assert_eq!(empty.last_page, 1);
    }
}
