//! Page-number pagination.

use serde::{Deserialize, Serialize};

/// A requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u64,
    pub page_size: Option<u64>,
}

const fn first_page() -> u64 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
        }
    }
}

impl PageRequest {
    /// Request a specific page and size.
    #[must_use]
    pub const fn new(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size: Some(page_size),
        }
    }

    /// Resolve to `(page, limit, offset)` with the size clamped to `1..=max`.
    #[must_use]
    pub fn resolve(&self, default_size: u64, max_size: u64) -> (u64, u64, u64) {
        let page = self.page.max(1);
        let limit = self.page_size.unwrap_or(default_size).clamp(1, max_size.max(1));
        (page, limit, (page - 1).saturating_mul(limit))
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page from the items of one window and the overall total.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u64, page_size: u64) -> Self {
        let has_next = page.saturating_mul(page_size) < total;
        Self {
            items,
            total,
            page,
            page_size,
            has_next,
        }
    }

    /// Transform the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let (page, limit, offset) = PageRequest::default().resolve(10, 50);
        assert_eq!((page, limit, offset), (1, 10, 0));
    }

    #[test]
    fn test_resolve_clamps_size_and_page() {
        assert_eq!(PageRequest::new(3, 500).resolve(10, 50), (3, 50, 100));
        assert_eq!(PageRequest::new(0, 0).resolve(10, 50), (1, 1, 0));
    }

    #[test]
    fn test_has_next() {
        assert!(Page::new(vec![1, 2], 5, 1, 2).has_next);
        assert!(!Page::new(vec![5], 5, 3, 2).has_next);
        assert!(!Page::<i32>::new(vec![], 0, 1, 10).has_next);
    }
}
