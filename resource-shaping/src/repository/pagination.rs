//! Offset/limit window handed to the storage collaborator

/// Pagination parameters for limiting query results
///
/// # Example
///
/// ```rust
/// use resource_shaping::repository::Pagination;
///
/// let second = Pagination::page(1, 20);
/// assert_eq!(second.offset, 20);
/// assert_eq!(second.limit, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create pagination for a zero-based page index
    #[must_use]
    pub const fn page(page_index: u64, page_size: u64) -> Self {
        Self {
            offset: page_index.saturating_mul(page_size),
            limit: page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_no_offset() {
        assert_eq!(
            Pagination::page(0, 5),
            Pagination {
                offset: 0,
                limit: 5
            }
        );
    }

    #[test]
    fn test_page_offset_saturates() {
        let pagination = Pagination::page(u64::MAX, 10);
        assert_eq!(pagination.offset, u64::MAX);
    }
}
