//! Handler trait for shaped REST resources
//!
//! Methods use RPITIT (Return Position Impl Trait In Traits) for async
//! without `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_shaping::handlers::{ApiError, ResourceHandler, ShapedResource};
//!
//! impl ResourceHandler<i32, PostFilter, PostAddResource, PostUpdateResource> for PostHandler {
//!     async fn get(&self, id: i32, fields: Option<String>) -> Result<ShapedResource, ApiError> {
//!         self.pipeline.validate_fields(fields.as_deref())?;
//!         let post = self.store.fetch_by_id(&id).await?
//!             .ok_or_else(|| ApiError::not_found("Post", id.to_string()))?;
//!         self.pipeline.shape_item(&self.mapper.to_resource(&post), fields.as_deref())
//!     }
//!
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use super::error::ApiError;
use super::response::{CollectionResponse, CreatedResponse, ShapedCollection, ShapedResource};
use crate::query::ResourceParameters;

/// Standard operations for a shaped REST resource
///
/// # Type Parameters
///
/// - `Id`: The identifier type of the resource
/// - `Filter`: Resource-specific collection filter
/// - `CreateDto`: Body accepted when creating
/// - `UpdateDto`: Body accepted when replacing
pub trait ResourceHandler<Id, Filter, CreateDto, UpdateDto>: Send + Sync {
    /// Shaped, paginated collection in the hypermedia envelope
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for unmapped sort fields, unknown projection
    /// fields, or an invalid page.
    fn list(
        &self,
        params: ResourceParameters<Filter>,
    ) -> impl Future<Output = Result<CollectionResponse<ShapedCollection>, ApiError>> + Send;

    /// One shaped resource with its links
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for unknown fields and `NotFound` when absent.
    fn get(
        &self,
        id: Id,
        fields: Option<String>,
    ) -> impl Future<Output = Result<ShapedResource, ApiError>> + Send;

    /// Create a resource, answering with its location and links
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` for an invalid body and `InternalError`
    /// when the save fails.
    fn create(
        &self,
        dto: CreateDto,
    ) -> impl Future<Output = Result<CreatedResponse<ShapedResource>, ApiError>> + Send;

    /// Replace the updatable fields of a resource
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `ValidationFailed`, or `InternalError` when the
    /// save fails.
    fn update(&self, id: Id, dto: UpdateDto) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a resource
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when absent and `InternalError` when the save fails.
    fn delete(&self, id: Id) -> impl Future<Output = Result<(), ApiError>> + Send;
}
