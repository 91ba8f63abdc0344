//! Post endpoints
//!
//! Each operation returns a value that renders itself as an HTTP response, so
//! the handler can be mounted on any axum router or driven directly. Every
//! operation stages its changes in its own unit of work.

use std::sync::Arc;

use chrono::Utc;
use resource_shaping::config::PagingConfig;
use resource_shaping::handlers::{
    ApiError, ApiOperation, CollectionResponse, CreatedResponse, FieldError, ResourceHandler,
    ResourcePipeline, ShapedCollection, ShapedResource,
};
use resource_shaping::projection::Projection;
use resource_shaping::query::ResourceParameters;
use resource_shaping::repository::{ShapeMapper, Storage};
use resource_shaping::Error;

use crate::mapping::PostMapper;
use crate::post::{Post, PostAddResource, PostFilter, PostPatch, PostResource, PostUpdateResource};
use crate::store::{InMemoryPostStore, PostUnitOfWork};

const ENTITY: &str = "Post";

/// Author recorded on posts created through the API
pub const CREATE_AUTHOR: &str = "admin";

/// Query parameters accepted by the post collection endpoints
pub type PostParameters = ResourceParameters<PostFilter>;

fn during<E: Into<ApiError>>(operation: ApiOperation) -> impl Fn(E) -> ApiError {
    move |err| err.into().with_operation(operation)
}

/// Post resource handler
pub struct PostHandler {
    store: Arc<InMemoryPostStore>,
    mapper: PostMapper,
    pipeline: ResourcePipeline<PostResource, Post>,
}

impl PostHandler {
    pub fn new(
        store: Arc<InMemoryPostStore>,
        pipeline: ResourcePipeline<PostResource, Post>,
        paging: &PagingConfig,
    ) -> Self {
        Self {
            store,
            mapper: PostMapper,
            pipeline: pipeline
                .with_default_page_size(paging.default_page_size)
                .with_max_page_size(paging.max_page_size),
        }
    }

    pub fn store(&self) -> &Arc<InMemoryPostStore> {
        &self.store
    }

    /// Shaped page without the hypermedia envelope; navigation links travel
    /// in the `X-Pagination` header
    ///
    /// # Errors
    ///
    /// Same as [`ResourceHandler::list`].
    pub async fn list_plain(
        &self,
        params: PostParameters,
    ) -> Result<CollectionResponse<Vec<Projection>>, ApiError> {
        let uow = self.store.unit_of_work();
        self.pipeline
            .list_plain::<_, _, i32, _>(&uow, &self.mapper, params)
            .await
            .map_err(|e| e.with_operation(ApiOperation::List))
    }

    /// Partially update a post
    ///
    /// The patch is applied to the current updatable fields and the result is
    /// validated as a full update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `ValidationFailed`, or `InternalError` when the
    /// save fails.
    pub async fn patch(&self, id: i32, patch: PostPatch) -> Result<(), ApiError> {
        let op = ApiOperation::PartialUpdate;
        let uow = self.store.unit_of_work();
        let mut post = Self::find(&uow, id, op).await?;

        let mut update = PostUpdateResource::from_post(&post);
        patch.apply(&mut update);
        Self::check(update.validate(), op)?;

        update.apply_to(&mut post);
        post.last_modified = Utc::now();
        uow.mark_updated(post).await.map_err(during(op))?;
        Self::save(&uow, op, format!("Patching post {id} failed on save.")).await
    }

    async fn find(
        uow: &PostUnitOfWork<'_>,
        id: i32,
        operation: ApiOperation,
    ) -> Result<Post, ApiError> {
        uow.fetch_by_id(&id)
            .await
            .map_err(during(operation))?
            .ok_or_else(|| ApiError::not_found(ENTITY, id.to_string()).with_operation(operation))
    }

    fn check(errors: Vec<FieldError>, operation: ApiOperation) -> Result<(), ApiError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_failed(errors).with_operation(operation))
        }
    }

    async fn save(
        uow: &PostUnitOfWork<'_>,
        operation: ApiOperation,
        message: String,
    ) -> Result<(), ApiError> {
        if uow.commit().await.map_err(during(operation))? {
            Ok(())
        } else {
            Err(during(operation)(Error::SaveFailed(message)))
        }
    }
}

impl ResourceHandler<i32, PostFilter, PostAddResource, PostUpdateResource> for PostHandler {
    async fn list(
        &self,
        params: PostParameters,
    ) -> Result<CollectionResponse<ShapedCollection>, ApiError> {
        let uow = self.store.unit_of_work();
        self.pipeline
            .list::<_, _, i32, _>(&uow, &self.mapper, params)
            .await
            .map_err(|e| e.with_operation(ApiOperation::List))
    }

    async fn get(&self, id: i32, fields: Option<String>) -> Result<ShapedResource, ApiError> {
        let op = ApiOperation::Get;
        let fields = fields.as_deref();
        self.pipeline
            .validate_fields(fields)
            .map_err(during(op))?;

        let post = Self::find(&self.store.unit_of_work(), id, op).await?;
        self.pipeline
            .shape_item(&self.mapper.to_resource(&post), fields)
            .map_err(during(op))
    }

    async fn create(
        &self,
        dto: PostAddResource,
    ) -> Result<CreatedResponse<ShapedResource>, ApiError> {
        let op = ApiOperation::Create;
        Self::check(dto.validate(), op)?;

        let post = Post {
            id: 0,
            title: dto.title,
            body: dto.body,
            author: CREATE_AUTHOR.to_string(),
            last_modified: Utc::now(),
            remark: dto.remark,
        };
        let uow = self.store.unit_of_work();
        let post = uow.add(post).await.map_err(during(op))?;
        Self::save(&uow, op, "Adding post failed on save.".to_string()).await?;
        tracing::info!(post_id = post.id, "Created post");

        let resource = self.mapper.to_resource(&post);
        let location = self
            .pipeline
            .links()
            .item_uri(&resource.id)
            .map_err(during(op))?;
        let body = self.pipeline.shape_item(&resource, None).map_err(during(op))?;
        Ok(CreatedResponse::new(location, body))
    }

    async fn update(&self, id: i32, dto: PostUpdateResource) -> Result<(), ApiError> {
        let op = ApiOperation::Update;
        Self::check(dto.validate(), op)?;

        let uow = self.store.unit_of_work();
        let mut post = Self::find(&uow, id, op).await?;
        dto.apply_to(&mut post);
        post.last_modified = Utc::now();
        uow.mark_updated(post).await.map_err(during(op))?;
        Self::save(&uow, op, format!("Updating post {id} failed on save.")).await
    }

    async fn delete(&self, id: i32) -> Result<(), ApiError> {
        let op = ApiOperation::Delete;
        let uow = self.store.unit_of_work();
        let post = Self::find(&uow, id, op).await?;
        uow.remove(&post).await.map_err(during(op))?;
        Self::save(&uow, op, format!("Deleting post {id} failed on save.")).await?;
        tracing::info!(post_id = id, "Deleted post");
        Ok(())
    }
}
