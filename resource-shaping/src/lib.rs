//! # resource-shaping
//!
//! Query shaping for REST resources: public field names mapped onto entity
//! properties, client `orderBy` expressions compiled into sort steps,
//! resources projected into client-selected field subsets, and paged
//! collections decorated with pagination metadata and hypermedia links.
//!
//! ## Components
//!
//! - [`mapping`]: property mapping tables and the process-wide registry
//! - [`fields`]: per-shape accessor tables and field-list validation
//! - [`sort`]: `orderBy` compilation and in-memory multi-key sorting
//! - [`projection`]: runtime projection into ordered field maps
//! - [`paging`]: page figures and the `X-Pagination` header
//! - [`links`]: route-table URI building and link sets
//! - [`handlers`]: the shared read pipeline, API errors and responses
//!
//! Storage and shape mapping are collaborators supplied by the application
//! through the [`repository`] traits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use resource_shaping::prelude::*;
//!
//! # struct PostResource;
//! # struct Post;
//! fn main() -> Result<()> {
//!     let config = Config::load_for_service("blog-service")?;
//!     init_tracing(&config);
//!
//!     let registry = init_global(|registry| {
//!         registry.register::<PostResource, Post>(
//!             PropertyMapping::builder()
//!                 .field("title")
//!                 .map("updateTime", [MappedProperty::new("last_modified")])
//!                 .build(),
//!         )
//!     })?;
//!
//!     let steps = registry.compile_sort::<PostResource, Post>(Some("updateTime desc"))?;
//!     assert_eq!(steps[0].property, "last_modified");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fields;
pub mod handlers;
pub mod links;
pub mod mapping;
pub mod observability;
pub mod paging;
pub mod projection;
pub mod query;
pub mod repository;
pub mod sort;

pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::config::{Config, PagingConfig, SeedConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::fields::{ensure_fields_exist, fields_exist, FieldTable, Resource, Shape};
    pub use crate::handlers::{
        ApiError, ApiErrorKind, ApiOperation, CollectionResponse, CreatedResponse, FieldError,
        ResourceHandler, ResourcePipeline, ShapedCollection, ShapedResource,
    };
    pub use crate::links::{Link, LinkBuilder, LinkSet, ResourceRoutes, RouteTable, UriBuilder};
    pub use crate::mapping::{
        global, init_global, MappedProperty, MappingRegistry, PropertyMapping,
    };
    pub use crate::observability::init_tracing;
    pub use crate::paging::{paginate, Page, PaginationHeader, PAGINATION_HEADER};
    pub use crate::projection::{shape, shape_many, Projection};
    pub use crate::query::{FilterParameters, NoFilter, ResourceParameters};
    pub use crate::repository::{
        Pagination, RepositoryError, RepositoryErrorKind, RepositoryOperation, RepositoryResult,
        ShapeMapper, Storage,
    };
    pub use crate::sort::{apply_sort, compile_sort, PropertyOrdering, SortDirection, SortStep};
}
