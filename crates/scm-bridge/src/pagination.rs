//! List options and paginated responses.
//!
//! Providers paginate with `page`/`per_page` style query parameters and
//! report neighbouring pages in a `Link` header.

use serde::{Deserialize, Serialize};

/// Page selection for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub size: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { page: 1, size: 30 }
    }
}

impl ListOptions {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Render as `page=<n>&per_page=<n>`.
    pub fn to_query(&self) -> String {
        format!("page={}&per_page={}", self.page.max(1), self.size.max(1))
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    /// Items in this page
    pub items: Vec<T>,

    /// Pagination metadata
    pub pagination: Pagination,
}

/// Pagination metadata extracted from Link headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// URL for next page (if available)
    pub next: Option<String>,

    /// URL for previous page (if available)
    pub prev: Option<String>,

    /// URL for first page (if available)
    pub first: Option<String>,

    /// URL for last page (if available)
    pub last: Option<String>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }
}

impl<T> PagedResponse<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    /// Map every item, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResponse<U> {
        PagedResponse {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    pub fn has_next(&self) -> bool {
        self.pagination.has_next()
    }

    /// Page number of the next page, read from its URL.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scm_bridge::{PagedResponse, Pagination};
    ///
    /// let pagination = Pagination {
    ///     next: Some("https://api.github.com/repos/o/r/issues?page=3".to_string()),
    ///     ..Default::default()
    /// };
    /// let response = PagedResponse::new(vec![1, 2, 3], pagination);
    ///
    /// assert_eq!(response.next_page_number(), Some(3));
    /// ```
    pub fn next_page_number(&self) -> Option<u32> {
        self.pagination
            .next
            .as_deref()
            .and_then(extract_page_number)
    }

    pub fn is_last_page(&self) -> bool {
        !self.has_next()
    }
}

/// Parse pagination metadata from a Link header such as
/// `<https://api.github.com/resource?page=2>; rel="next", <https://api.github.com/resource?page=5>; rel="last"`.
pub fn parse_link_header(link_header: Option<&str>) -> Pagination {
    let mut pagination = Pagination::default();

    let Some(header) = link_header else {
        return pagination;
    };

    for link in header.split(',') {
        let Some((url, rel)) = link.split_once(';') else {
            continue;
        };

        let url = url.trim().trim_start_matches('<').trim_end_matches('>');
        let rel = rel.trim().trim_start_matches("rel=\"").trim_end_matches('"');

        match rel {
            "next" => pagination.next = Some(url.to_string()),
            "prev" => pagination.prev = Some(url.to_string()),
            "first" => pagination.first = Some(url.to_string()),
            "last" => pagination.last = Some(url.to_string()),
            _ => {}
        }
    }

    pagination
}

/// Read the `page` query parameter of a URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
