//! Read-side request pipeline shared by resource handlers
//!
//! Validation happens before storage is touched: an unmapped `orderBy`
//! field or an unknown projection field is a bad request. The count and
//! page fetch run concurrently, then the page is mapped to its public
//! shape, projected, and decorated with links.

use std::marker::PhantomData;

use futures::try_join;

use super::error::{ApiError, UNKNOWN_FIELDS, UNKNOWN_SORT_FIELDS};
use super::response::{CollectionResponse, ShapedCollection, ShapedResource};
use crate::fields::{fields_exist, Resource};
use crate::links::{LinkBuilder, RouteTable, UriBuilder};
use crate::mapping::MappingRegistry;
use crate::paging::{paginate, Page};
use crate::projection::{shape, shape_many, Projection};
use crate::query::{FilterParameters, ResourceParameters, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::repository::{ShapeMapper, Storage};
use crate::sort::SortStep;

/// Validation, paging, projection and linking for resource `R` backed by entity `E`
pub struct ResourcePipeline<R, E, U = RouteTable> {
    registry: &'static MappingRegistry,
    links: LinkBuilder<U>,
    default_page_size: i64,
    max_page_size: i64,
    _shape: PhantomData<fn() -> (R, E)>,
}

impl<R, E, U> ResourcePipeline<R, E, U>
where
    R: Resource,
    E: 'static,
    U: UriBuilder,
{
    pub fn new(registry: &'static MappingRegistry, links: LinkBuilder<U>) -> Self {
        Self {
            registry,
            links,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            _shape: PhantomData,
        }
    }

    /// Page size used when a request gives none
    #[must_use]
    pub fn with_default_page_size(mut self, default_page_size: i64) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: i64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn links(&self) -> &LinkBuilder<U> {
        &self.links
    }

    /// Apply the default page size, then the cap
    pub fn resolve<F>(&self, params: ResourceParameters<F>) -> ResourceParameters<F> {
        params
            .or_page_size(self.default_page_size)
            .capped(self.max_page_size)
    }

    /// Reject unknown projection fields
    ///
    /// # Errors
    ///
    /// Returns a bad request when a field does not exist on `R`.
    pub fn validate_fields(&self, fields: Option<&str>) -> Result<(), ApiError> {
        if fields_exist::<R>(fields) {
            Ok(())
        } else {
            Err(ApiError::bad_request(UNKNOWN_FIELDS))
        }
    }

    /// Validate the sort expression and field list, then compile the sort
    ///
    /// # Errors
    ///
    /// Returns a bad request for unmapped sort fields or unknown projection
    /// fields, and an internal error if `R` → `E` has no mapping.
    pub fn validate<F>(&self, params: &ResourceParameters<F>) -> Result<Vec<SortStep>, ApiError> {
        if !self
            .registry
            .validate_mapping_exists::<R, E>(params.order_by())?
        {
            return Err(ApiError::bad_request(UNKNOWN_SORT_FIELDS));
        }
        self.validate_fields(params.fields())?;
        Ok(self.registry.compile_sort::<R, E>(params.order_by())?)
    }

    /// Count and fetch one page of entities concurrently
    ///
    /// # Errors
    ///
    /// Returns a bad request for an invalid page, or the storage error.
    pub async fn fetch_page<S, Id, F>(
        &self,
        storage: &S,
        params: &ResourceParameters<F>,
        sort: &[SortStep],
    ) -> Result<Page<E>, ApiError>
    where
        S: Storage<Id, E, F>,
    {
        let pagination = params.pagination()?;
        let (total, items) = try_join!(
            storage.count(&params.filter),
            storage.fetch_page(&params.filter, sort, pagination)
        )?;
        Ok(paginate(params.page_index, params.page_size(), total, items)?)
    }

    /// Projection plus item links for one resource
    ///
    /// # Errors
    ///
    /// Returns an internal error if projection or link building fails.
    pub fn shape_item(
        &self,
        resource: &R,
        fields: Option<&str>,
    ) -> Result<ShapedResource, ApiError> {
        let data = shape(resource, fields)?;
        let links = self.links.links_for_item(&resource.id(), fields)?;
        Ok(ShapedResource::new(data, links))
    }

    /// Hypermedia envelope for a page of resources
    ///
    /// # Errors
    ///
    /// Returns an internal error if projection or link building fails.
    pub fn shape_collection<F: FilterParameters>(
        &self,
        page: &Page<R>,
        params: &ResourceParameters<F>,
    ) -> Result<CollectionResponse<ShapedCollection>, ApiError> {
        let value = page
            .items()
            .iter()
            .map(|resource| self.shape_item(resource, params.fields()))
            .collect::<Result<Vec<_>, _>>()?;
        let links = self
            .links
            .links_for_collection(params, page.has_previous(), page.has_next())?;

        Ok(CollectionResponse::new(
            ShapedCollection { value, links },
            page.header(),
        ))
    }

    /// Plain projected page with navigation links in the header
    ///
    /// # Errors
    ///
    /// Returns an internal error if projection or link building fails.
    pub fn shape_plain<F: FilterParameters>(
        &self,
        page: &Page<R>,
        params: &ResourceParameters<F>,
    ) -> Result<CollectionResponse<Vec<Projection>>, ApiError> {
        let previous = page
            .has_previous()
            .then(|| self.links.collection_uri(params, params.page_index - 1))
            .transpose()?;
        let next = page
            .has_next()
            .then(|| self.links.collection_uri(params, params.page_index + 1))
            .transpose()?;

        Ok(CollectionResponse::new(
            shape_many(page.items(), params.fields())?,
            page.header().with_links(previous, next),
        ))
    }

    /// Full hypermedia list: validate, fetch, map, shape, link
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate) and [`fetch_page`](Self::fetch_page).
    pub async fn list<S, M, Id, F>(
        &self,
        storage: &S,
        mapper: &M,
        params: ResourceParameters<F>,
    ) -> Result<CollectionResponse<ShapedCollection>, ApiError>
    where
        S: Storage<Id, E, F>,
        M: ShapeMapper<E, R>,
        F: FilterParameters,
    {
        let params = self.resolve(params);
        let sort = self.validate(&params)?;
        let page = self.fetch_page(storage, &params, &sort).await?;
        let page = page.map(|entity| mapper.to_resource(&entity));
        tracing::debug!(
            page_index = page.index(),
            page_size = page.size(),
            total = page.total_count(),
            "Listed shaped collection"
        );
        self.shape_collection(&page, &params)
    }

    /// Plain list: validate, fetch, map, shape
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate) and [`fetch_page`](Self::fetch_page).
    pub async fn list_plain<S, M, Id, F>(
        &self,
        storage: &S,
        mapper: &M,
        params: ResourceParameters<F>,
    ) -> Result<CollectionResponse<Vec<Projection>>, ApiError>
    where
        S: Storage<Id, E, F>,
        M: ShapeMapper<E, R>,
        F: FilterParameters,
    {
        let params = self.resolve(params);
        let sort = self.validate(&params)?;
        let page = self.fetch_page(storage, &params, &sort).await?;
        let page = page.map(|entity| mapper.to_resource(&entity));
        self.shape_plain(&page, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::test_shapes::{article, Article};
    use crate::handlers::ApiErrorKind;
    use crate::links::ResourceRoutes;
    use crate::mapping::PropertyMapping;
    use crate::query::NoFilter;
    use crate::repository::{Pagination, RepositoryResult};

    struct ArticleRow(Article);

    struct RowStorage {
        rows: Vec<Article>,
    }

    impl Storage<u32, ArticleRow, NoFilter> for RowStorage {
        async fn count(&self, _filter: &NoFilter) -> RepositoryResult<u64> {
            Ok(self.rows.len() as u64)
        }

        async fn fetch_page(
            &self,
            _filter: &NoFilter,
            _sort: &[SortStep],
            pagination: Pagination,
        ) -> RepositoryResult<Vec<ArticleRow>> {
            Ok(self
                .rows
                .iter()
                .skip(pagination.offset as usize)
                .take(pagination.limit as usize)
                .cloned()
                .map(ArticleRow)
                .collect())
        }

        async fn fetch_by_id(&self, id: &u32) -> RepositoryResult<Option<ArticleRow>> {
            Ok(self.rows.iter().find(|a| a.id == *id).cloned().map(ArticleRow))
        }

        async fn add(&self, entity: ArticleRow) -> RepositoryResult<ArticleRow> {
            Ok(entity)
        }

        async fn remove(&self, _entity: &ArticleRow) -> RepositoryResult<()> {
            Ok(())
        }

        async fn mark_updated(&self, _entity: ArticleRow) -> RepositoryResult<()> {
            Ok(())
        }

        async fn commit(&self) -> RepositoryResult<bool> {
            Ok(true)
        }
    }

    struct RowMapper;

    impl ShapeMapper<ArticleRow, Article> for RowMapper {
        fn to_resource(&self, entity: &ArticleRow) -> Article {
            entity.0.clone()
        }

        fn to_entity(&self, resource: &Article) -> ArticleRow {
            ArticleRow(resource.clone())
        }
    }

    fn pipeline() -> ResourcePipeline<Article, ArticleRow> {
        let mut registry = MappingRegistry::new();
        registry
            .register::<Article, ArticleRow>(PropertyMapping::builder().field("title").build())
            .unwrap();
        let routes = ResourceRoutes::new("article");
        let table = RouteTable::new("http://test").with_resource(&routes, "/api/articles");
        ResourcePipeline::new(Box::leak(Box::new(registry)), LinkBuilder::new(table, routes))
    }

    fn storage() -> RowStorage {
        RowStorage {
            rows: (1..=8).map(|i| article(i, &format!("Article {i}"))).collect(),
        }
    }

    #[test]
    fn test_validate_rejects_unmapped_sort_field() {
        let params: ResourceParameters = ResourceParameters::default().with_order_by("body");
        let err = pipeline().validate(&params).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::BadRequest);
        assert_eq!(err.message, UNKNOWN_SORT_FIELDS);
    }

    #[test]
    fn test_validate_rejects_unknown_projection_field() {
        let params: ResourceParameters = ResourceParameters::default().with_fields("title,colour");
        let err = pipeline().validate(&params).unwrap_err();
        assert_eq!(err.message, UNKNOWN_FIELDS);
    }

    #[test]
    fn test_validate_compiles_sort() {
        let params: ResourceParameters = ResourceParameters::default().with_order_by("title desc");
        let steps = pipeline().validate(&params).unwrap();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_descending());
    }

    #[tokio::test]
    async fn test_list_first_page() {
        let params: ResourceParameters = ResourceParameters::default()
            .with_page_size(5)
            .with_fields("title");
        let response = pipeline()
            .list::<_, _, u32, _>(&storage(), &RowMapper, params)
            .await
            .unwrap();

        assert_eq!(response.pagination.page_count, 2);
        assert_eq!(response.body.value.len(), 5);
        let first = &response.body.value[0];
        assert_eq!(first.data.keys().collect::<Vec<_>>(), vec!["title"]);
        assert_eq!(
            first.links.rel("self").unwrap().href,
            "http://test/api/articles/1?fields=title"
        );
        let rels: Vec<_> = response.body.links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "next_page"]);
    }

    #[tokio::test]
    async fn test_list_plain_last_page_carries_previous_link() {
        let params: ResourceParameters =
            ResourceParameters::default().with_page_index(1).with_page_size(5);
        let response = pipeline()
            .list_plain::<_, _, u32, _>(&storage(), &RowMapper, params)
            .await
            .unwrap();

        assert_eq!(response.body.len(), 3);
        assert_eq!(
            response.pagination.previous_page_link.as_deref(),
            Some("http://test/api/articles?pageIndex=0&pageSize=5")
        );
        assert!(response.pagination.next_page_link.is_none());
    }

    #[tokio::test]
    async fn test_page_size_is_capped() {
        let params: ResourceParameters = ResourceParameters::default().with_page_size(1_000);
        let response = pipeline()
            .with_max_page_size(4)
            .list::<_, _, u32, _>(&storage(), &RowMapper, params)
            .await
            .unwrap();
        assert_eq!(response.pagination.page_size, 4);
        assert_eq!(response.body.value.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_page_size_uses_configured_default() {
        let params: ResourceParameters = serde_json::from_str(r#"{"pageIndex":1}"#).unwrap();
        let response = pipeline()
            .with_default_page_size(3)
            .list::<_, _, u32, _>(&storage(), &RowMapper, params)
            .await
            .unwrap();
        assert_eq!(response.pagination.page_size, 3);
        assert_eq!(response.pagination.page_count, 3);
        let ids: Vec<_> = response
            .body
            .value
            .iter()
            .map(|item| item.data.get("id").and_then(serde_json::Value::as_u64))
            .collect();
        assert_eq!(ids, vec![Some(4), Some(5), Some(6)]);
        let next = response.body.links.rel("next_page").unwrap();
        assert_eq!(next.href, "http://test/api/articles?pageIndex=2&pageSize=3");
    }

    #[tokio::test]
    async fn test_invalid_page_is_bad_request() {
        let params: ResourceParameters = ResourceParameters::default().with_page_index(-1);
        let err = pipeline()
            .list::<_, _, u32, _>(&storage(), &RowMapper, params)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::BadRequest);
    }
}
