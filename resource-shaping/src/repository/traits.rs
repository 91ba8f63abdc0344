//! Collaborator traits consumed by the shaping engine
//!
//! The engine never talks to a database directly. Storage and shape mapping
//! are supplied by the application through these traits, which use RPITIT
//! (Return Position Impl Trait In Traits) for async methods without
//! `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_shaping::repository::{Pagination, RepositoryResult, Storage};
//! use resource_shaping::sort::SortStep;
//!
//! impl Storage<i32, Post, PostFilter> for PostStore {
//!     async fn count(&self, filter: &PostFilter) -> RepositoryResult<u64> {
//!         todo!()
//!     }
//!
//!     async fn fetch_page(
//!         &self,
//!         filter: &PostFilter,
//!         sort: &[SortStep],
//!         pagination: Pagination,
//!     ) -> RepositoryResult<Vec<Post>> {
//!         todo!()
//!     }
//!
//!     // ... other required methods
//! }
//! ```

use std::future::Future;

use super::error::RepositoryError;
use super::pagination::Pagination;
use crate::sort::SortStep;

/// Result type for storage operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage collaborator with unit-of-work semantics
///
/// `add`, `remove` and `mark_updated` stage changes; nothing is durable until
/// `commit` succeeds. `count` and `fetch_page` must observe the same filter so
/// the page count matches the page contents.
///
/// # Type Parameters
///
/// - `Id`: The identifier type for the entity
/// - `Entity`: The persisted entity type
/// - `Filter`: Collaborator-specific filter criteria
pub trait Storage<Id, Entity, Filter>: Send + Sync {
    /// Count entities matching the filter
    fn count(&self, filter: &Filter) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Fetch one page of entities matching the filter
    ///
    /// Sort steps apply in order as primary, secondary, ... keys. Ties left
    /// after the last step are broken by identity ascending.
    fn fetch_page(
        &self,
        filter: &Filter,
        sort: &[SortStep],
        pagination: Pagination,
    ) -> impl Future<Output = RepositoryResult<Vec<Entity>>> + Send;

    /// Fetch a single entity, `Ok(None)` when absent
    fn fetch_by_id(&self, id: &Id) -> impl Future<Output = RepositoryResult<Option<Entity>>> + Send;

    /// Stage a new entity, returning it with its assigned identity
    fn add(&self, entity: Entity) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Stage removal of an entity
    fn remove(&self, entity: &Entity) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Stage a modified entity
    fn mark_updated(&self, entity: Entity) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Apply staged changes
    ///
    /// `Ok(false)` means the save failed; callers surface it as a fatal error.
    fn commit(&self) -> impl Future<Output = RepositoryResult<bool>> + Send;
}

/// Translates between persisted entities and public resource shapes
pub trait ShapeMapper<Entity, Resource>: Send + Sync {
    /// Map an entity to its public shape
    fn to_resource(&self, entity: &Entity) -> Resource;

    /// Map a public shape back to an entity
    fn to_entity(&self, resource: &Resource) -> Entity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_result_type() {
        let ok_result: RepositoryResult<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: RepositoryResult<i32> = Err(RepositoryError::not_found("Test", "123"));
        assert!(err_result.is_err());
    }

    #[derive(Clone)]
    struct MockEntity {
        id: u32,
    }

    struct MockResource {
        key: String,
    }

    struct MockStorage;

    impl Storage<u32, MockEntity, ()> for MockStorage {
        async fn count(&self, _filter: &()) -> RepositoryResult<u64> {
            Ok(1)
        }

        async fn fetch_page(
            &self,
            _filter: &(),
            _sort: &[SortStep],
            _pagination: Pagination,
        ) -> RepositoryResult<Vec<MockEntity>> {
            Ok(vec![MockEntity { id: 1 }])
        }

        async fn fetch_by_id(&self, id: &u32) -> RepositoryResult<Option<MockEntity>> {
            Ok((*id == 1).then_some(MockEntity { id: 1 }))
        }

        async fn add(&self, entity: MockEntity) -> RepositoryResult<MockEntity> {
            Ok(entity)
        }

        async fn remove(&self, _entity: &MockEntity) -> RepositoryResult<()> {
            Ok(())
        }

        async fn mark_updated(&self, _entity: MockEntity) -> RepositoryResult<()> {
            Ok(())
        }

        async fn commit(&self) -> RepositoryResult<bool> {
            Ok(true)
        }
    }

    struct MockMapper;

    impl ShapeMapper<MockEntity, MockResource> for MockMapper {
        fn to_resource(&self, entity: &MockEntity) -> MockResource {
            MockResource {
                key: format!("m{}", entity.id),
            }
        }

        fn to_entity(&self, resource: &MockResource) -> MockEntity {
            MockEntity {
                id: resource.key.trim_start_matches('m').parse().unwrap_or_default(),
            }
        }
    }

    #[tokio::test]
    async fn test_storage_can_be_implemented() {
        let storage = MockStorage;
        assert_eq!(storage.count(&()).await.unwrap(), 1);
        assert!(storage.fetch_by_id(&2).await.unwrap().is_none());
        assert!(storage.commit().await.unwrap());
    }

    #[test]
    fn test_mapper_maps_both_ways() {
        let mapper = MockMapper;
        let resource = mapper.to_resource(&MockEntity { id: 3 });
        assert_eq!(resource.key, "m3");
        assert_eq!(mapper.to_entity(&resource).id, 3);
    }
}
