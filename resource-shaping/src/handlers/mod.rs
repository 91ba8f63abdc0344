//! Handler-level building blocks for shaped REST resources
//!
//! - [`ResourcePipeline`] runs the read path: validation, concurrent count
//!   and fetch, mapping, projection, and links
//! - [`ResourceHandler`] is the trait resource handlers implement
//! - [`ApiError`] maps engine and storage failures to HTTP statuses
//!
//! The response types implement `IntoResponse`, so they can be returned
//! directly from Axum handlers:
//!
//! ```rust,ignore
//! use axum::extract::{Query, State};
//! use resource_shaping::handlers::{ApiError, ResourceHandler};
//!
//! async fn list_posts(
//!     State(handler): State<PostHandler>,
//!     Query(params): Query<ResourceParameters<PostFilter>>,
//! ) -> Result<impl IntoResponse, ApiError> {
//!     handler.list(params).await
//! }
//! ```

mod error;
mod pipeline;
mod response;
mod traits;

pub use error::{
    ApiError, ApiErrorKind, ApiOperation, FieldError, UNKNOWN_FIELDS, UNKNOWN_SORT_FIELDS,
};
pub use pipeline::ResourcePipeline;
pub use response::{CollectionResponse, CreatedResponse, ShapedCollection, ShapedResource};
pub use traits::ResourceHandler;
