use serde::{Deserialize, Serialize};

use crate::config;

/// Zero-based pagination parameters, as supplied in query strings.
/// Missing values fall back to the configured defaults; the page size
/// is clamped to the configured maximum.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self { page, size }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn size(&self) -> i64 {
        let api = &config::config().api;
        self.size
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size)
    }

    pub fn offset(&self) -> i64 {
        self.page() * self.size()
    }
}

/// One page of results plus the totals a client needs to paginate
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, params: &PageParams, total_elements: i64) -> Self {
        let size = params.size();
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + size - 1) / size
        };

        Self {
            content,
            page: params.page(),
            size,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_page_clamps_to_zero() {
        let params = PageParams::new(Some(-3), Some(10));
        assert_eq!(params.page(), 0);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn size_clamps_to_configured_maximum() {
        let params = PageParams::new(Some(0), Some(10_000));
        assert!(params.size() <= crate::config::config().api.max_page_size);

        let params = PageParams::new(Some(0), Some(0));
        assert_eq!(params.size(), 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams::new(Some(0), Some(10));
        let page: Page<i32> = Page::new(vec![], &params, 21);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], &params, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
