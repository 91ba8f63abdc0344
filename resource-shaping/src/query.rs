//! Client query parameters for collection requests
//!
//! [`ResourceParameters`] carries the zero-based page index, page size,
//! `orderBy` expression, field list, and a resource-specific filter. The
//! same parameters are re-serialized into navigation links, so every value
//! a client supplies survives a round trip through `previous_page` and
//! `next_page`.
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::query::{NoFilter, ResourceParameters};
//!
//! let params = ResourceParameters::<NoFilter>::default()
//!     .with_page_index(2)
//!     .with_page_size(5)
//!     .with_order_by("title desc");
//!
//! let pagination = params.pagination().unwrap();
//! assert_eq!(pagination.offset, 10);
//! assert_eq!(pagination.limit, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repository::Pagination;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum allowed items per page
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resource-specific filter values carried alongside paging parameters
pub trait FilterParameters {
    /// Non-empty filter values as query-string pairs, in a stable order
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Filter for collections that accept none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoFilter {}

impl FilterParameters for NoFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Paging, sorting, shaping, and filter parameters for a collection request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceParameters<F = NoFilter> {
    /// Zero-based page index
    #[serde(default)]
    pub page_index: i64,

    /// Items per page; absent means the serving pipeline's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,

    /// Comma-separated sort expression, e.g. `title desc, author`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Comma-separated field list for projection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,

    #[serde(flatten)]
    pub filter: F,
}

impl<F: Default> Default for ResourceParameters<F> {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: None,
            order_by: None,
            fields: None,
            filter: F::default(),
        }
    }
}

impl<F> ResourceParameters<F> {
    #[must_use]
    pub fn with_page_index(mut self, page_index: i64) -> Self {
        self.page_index = page_index;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Fill in the page size when the client gave none
    #[must_use]
    pub fn or_page_size(mut self, default_page_size: i64) -> Self {
        self.page_size.get_or_insert(default_page_size);
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = filter;
        self
    }

    /// Cap the page size at `max_page_size`
    ///
    /// Non-positive sizes are left alone so that [`pagination`](Self::pagination)
    /// reports them.
    #[must_use]
    pub fn capped(mut self, max_page_size: i64) -> Self {
        self.page_size = self.page_size.map(|size| size.min(max_page_size));
        self
    }

    /// Effective page size, [`DEFAULT_PAGE_SIZE`] when none was given
    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// The `orderBy` expression, treating blank as absent
    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The field list, treating blank as absent
    pub fn fields(&self) -> Option<&str> {
        self.fields.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Storage offset and limit for the requested page
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPage`] for a negative index or non-positive size.
    pub fn pagination(&self) -> Result<Pagination> {
        if self.page_index < 0 {
            return Err(Error::InvalidPage(format!(
                "page index must not be negative, got {}",
                self.page_index
            )));
        }
        let page_size = self.page_size();
        if page_size <= 0 {
            return Err(Error::InvalidPage(format!(
                "page size must be positive, got {page_size}"
            )));
        }
        Ok(Pagination::page(self.page_index as u64, page_size as u64))
    }
}

impl<F: FilterParameters> ResourceParameters<F> {
    /// Query-string pairs for these parameters at another page index
    ///
    /// Order is `pageIndex`, `pageSize`, `orderBy`, `fields`, then the
    /// filter's own pairs. Absent values are omitted.
    pub fn to_query_pairs(&self, page_index: i64) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageIndex", page_index.to_string()),
            ("pageSize", self.page_size().to_string()),
        ];
        if let Some(order_by) = self.order_by() {
            pairs.push(("orderBy", order_by.to_string()));
        }
        if let Some(fields) = self.fields() {
            pairs.push(("fields", fields.to_string()));
        }
        pairs.extend(self.filter.query_pairs());
        pairs
    }
}
