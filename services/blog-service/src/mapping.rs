//! Post property mapping and entity/shape conversion

use resource_shaping::prelude::*;

use crate::post::{Post, PostResource};

/// Sortable public fields of [`PostResource`] and their backing properties
pub fn post_property_mapping() -> PropertyMapping {
    PropertyMapping::builder()
        .field("title")
        .field("body")
        .field("author")
        .map("update_time", [MappedProperty::new("last_modified")])
        .build()
}

/// Register every mapping this service needs
pub fn register_mappings(registry: &mut MappingRegistry) -> Result<()> {
    registry.register::<PostResource, Post>(post_property_mapping())
}

/// The process-wide registry with the post mappings installed
pub fn post_mappings() -> Result<&'static MappingRegistry> {
    init_global(register_mappings)
}

/// Converts between [`Post`] and [`PostResource`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PostMapper;

impl ShapeMapper<Post, PostResource> for PostMapper {
    fn to_resource(&self, post: &Post) -> PostResource {
        PostResource {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            author: post.author.clone(),
            update_time: post.last_modified,
            remark: post.remark.clone(),
        }
    }

    fn to_entity(&self, resource: &PostResource) -> Post {
        Post {
            id: resource.id,
            title: resource.title.clone(),
            body: resource.body.clone(),
            author: resource.author.clone(),
            last_modified: resource.update_time,
            remark: resource.remark.clone(),
        }
    }
}
