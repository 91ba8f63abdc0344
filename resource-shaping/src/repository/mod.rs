//! Storage and shape-mapping collaborators
//!
//! - [`Storage`]: count, fetch-page, fetch-by-id and unit-of-work staging
//! - [`ShapeMapper`]: entity ⇄ resource translation
//! - [`Pagination`]: offset/limit window for `fetch_page`
//! - [`RepositoryError`]: structured collaborator errors

mod error;
mod pagination;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use pagination::Pagination;
pub use traits::{RepositoryResult, ShapeMapper, Storage};
