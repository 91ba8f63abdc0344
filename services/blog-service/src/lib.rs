//! # blog-service
//!
//! Blog posts API on top of the resource-shaping engine.
//!
//! [`bootstrap`] installs the post mappings, builds the route table from
//! `service.base_url`, creates the in-memory store and seeds it. The returned
//! [`PostHandler`] answers list, get, create, update, patch and delete.
//!
//! ```rust,no_run
//! use blog_service::{bootstrap, PostParameters};
//! use resource_shaping::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let config = Config::load_for_service("blog-service")?;
//! init_tracing(&config);
//!
//! let posts = bootstrap(&config).await?;
//! let params = PostParameters::default().with_order_by("update_time desc");
//! let page = posts.list(params).await;
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod mapping;
pub mod post;
pub mod seed;
pub mod store;

use std::sync::Arc;

use resource_shaping::prelude::*;

pub use handler::{PostHandler, PostParameters, CREATE_AUTHOR};
pub use mapping::{post_mappings, post_property_mapping, PostMapper};
pub use post::{Post, PostAddResource, PostFilter, PostPatch, PostResource, PostUpdateResource};
pub use store::{InMemoryPostStore, PostUnitOfWork};

/// Mount path of the post endpoints
pub const POSTS_PATH: &str = "/api/posts";

/// Route names of the post endpoints
pub fn post_routes() -> ResourceRoutes {
    ResourceRoutes::new("post")
}

/// Wire up a seeded post handler from configuration
///
/// # Errors
///
/// Fails if the mappings cannot be registered or seeding exhausts its
/// retries.
pub async fn bootstrap(config: &Config) -> Result<PostHandler> {
    let registry = post_mappings()?;

    let routes = post_routes();
    let table = RouteTable::new(config.service.base_url.clone()).with_resource(&routes, POSTS_PATH);
    let pipeline = ResourcePipeline::new(registry, LinkBuilder::new(table, routes));

    let store = Arc::new(InMemoryPostStore::new());
    seed::seed(&store.unit_of_work(), &config.seed).await?;

    tracing::info!(
        service = %config.service.name,
        base_url = %config.service.base_url,
        "Post handler ready"
    );
    Ok(PostHandler::new(store, pipeline, &config.paging))
}
