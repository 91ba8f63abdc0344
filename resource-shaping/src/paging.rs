//! Page results and pagination metadata
//!
//! A [`Page`] pairs the items of one zero-based page with the figures needed
//! to describe its position in the full result set. The metadata travels to
//! clients as the JSON-encoded `X-Pagination` response header.
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::paging::paginate;
//!
//! let page = paginate(0, 5, 8, vec![1, 2, 3, 4, 5]).unwrap();
//! assert_eq!(page.page_count(), 2);
//! assert!(page.has_next());
//! assert!(!page.has_previous());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the response header carrying [`PaginationHeader`]
pub const PAGINATION_HEADER: &str = "X-Pagination";

/// One page of a larger result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    index: i64,
    size: i64,
    total_count: u64,
    items: Vec<T>,
}

impl<T> Page<T> {
    /// Create a page, validating its figures
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPage`] when `index` is negative, `size` is not
    /// positive, or more than `size` items are supplied.
    ///
    /// # Example
    ///
    /// ```rust
    /// use resource_shaping::paging::Page;
    ///
    /// assert!(Page::new(-1, 10, 0, Vec::<u8>::new()).is_err());
    /// assert!(Page::new(0, 0, 0, Vec::<u8>::new()).is_err());
    /// assert!(Page::new(0, 1, 2, vec![1, 2]).is_err());
    /// ```
    pub fn new(index: i64, size: i64, total_count: u64, items: Vec<T>) -> Result<Self> {
        if index < 0 {
            return Err(Error::InvalidPage(format!(
                "page index must not be negative, got {index}"
            )));
        }
        if size <= 0 {
            return Err(Error::InvalidPage(format!(
                "page size must be positive, got {size}"
            )));
        }
        if items.len() as u64 > size as u64 {
            return Err(Error::InvalidPage(format!(
                "page holds {} items but its size is {size}",
                items.len()
            )));
        }

        Ok(Self {
            index,
            size,
            total_count,
            items,
        })
    }

    /// Zero-based page index
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Requested page size
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Number of items across all pages
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of pages, rounding up
    pub fn page_count(&self) -> u64 {
        let size = self.size as u64;
        self.total_count.saturating_add(size - 1) / size
    }

    /// Whether an earlier page exists
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Whether a later page exists
    pub fn has_next(&self) -> bool {
        (self.index as u64).saturating_add(1) < self.page_count()
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Map each item, keeping the page figures
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            index: self.index,
            size: self.size,
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect(),
        }
    }

    /// Header metadata without navigation links
    pub fn header(&self) -> PaginationHeader {
        PaginationHeader {
            page_size: self.size,
            page_index: self.index,
            total_items_count: self.total_count,
            page_count: self.page_count(),
            previous_page_link: None,
            next_page_link: None,
        }
    }
}

/// Build a [`Page`] from a fetched slice
///
/// # Errors
///
/// See [`Page::new`].
pub fn paginate<T>(index: i64, size: i64, total_count: u64, items: Vec<T>) -> Result<Page<T>> {
    Page::new(index, size, total_count, items)
}

/// Pagination metadata serialized into the `X-Pagination` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHeader {
    pub page_size: i64,
    pub page_index: i64,
    pub total_items_count: u64,
    pub page_count: u64,
    /// Previous page URI, set only for representations without link sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_link: Option<String>,
    /// Next page URI, set only for representations without link sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_link: Option<String>,
}

impl PaginationHeader {
    /// Attach navigation links
    #[must_use]
    pub fn with_links(mut self, previous: Option<String>, next: Option<String>) -> Self {
        self.previous_page_link = previous;
        self.next_page_link = next;
        self
    }

    /// Serialize to the header value
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_header_value(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
