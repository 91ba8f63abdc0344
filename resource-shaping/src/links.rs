//! Hypermedia link construction
//!
//! Links are rendered through a [`UriBuilder`] collaborator addressed by
//! route name. [`RouteTable`] is the stock implementation: named
//! `{placeholder}` templates resolved against a base URL, with any
//! parameters not consumed by the template appended as a query string.
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::links::{LinkBuilder, ResourceRoutes, RouteTable};
//!
//! let routes = ResourceRoutes::new("post");
//! let table = RouteTable::new("http://localhost:5000").with_resource(&routes, "/api/posts");
//! let links = LinkBuilder::new(table, routes)
//!     .links_for_item(&7, Some("id,title"))
//!     .unwrap();
//!
//! assert_eq!(links[0].href, "http://localhost:5000/api/posts/7?fields=id%2Ctitle");
//! assert_eq!(links[1].rel, "delete_post");
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::{FilterParameters, ResourceParameters};

/// A single hypermedia link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    pub method: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            method: method.into(),
        }
    }
}

/// Ordered list of links attached to a representation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet(Vec<Link>);

impl LinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, link: Link) {
        self.0.push(link);
    }

    /// First link with the given relation
    pub fn rel(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.rel == rel)
    }

    pub fn into_inner(self) -> Vec<Link> {
        self.0
    }
}

impl Deref for LinkSet {
    type Target = [Link];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Link> for LinkSet {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renders absolute URIs for named routes
pub trait UriBuilder: Send + Sync {
    /// Build the URI for `route` with named parameters
    ///
    /// # Errors
    ///
    /// Returns [`Error::Route`] for an unknown route or a missing placeholder value.
    fn build(&self, route: &str, params: &[(&str, String)]) -> Result<String>;
}

/// Route names for one resource's endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoutes {
    /// Single item, e.g. `get_post`
    pub item: String,
    /// Collection, e.g. `get_posts`
    pub collection: String,
    /// Delete, e.g. `delete_post`; also the delete link's relation
    pub delete: String,
    /// Full update, e.g. `update_post`
    pub update: String,
    /// Partial update, e.g. `partially_update_post`
    pub partial_update: String,
}

impl ResourceRoutes {
    /// Conventional route names for a singular resource name
    pub fn new(resource: &str) -> Self {
        Self {
            item: format!("get_{resource}"),
            collection: format!("get_{resource}s"),
            delete: format!("delete_{resource}"),
            update: format!("update_{resource}"),
            partial_update: format!("partially_update_{resource}"),
        }
    }
}

/// Named URI templates resolved against a base URL
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    base_url: String,
    routes: HashMap<String, String>,
}

impl RouteTable {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            routes: HashMap::new(),
        }
    }

    /// Register a route template such as `/api/posts/{id}`
    #[must_use]
    pub fn route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.routes.insert(name.into(), template.into());
        self
    }

    /// Register every route of a resource mounted at `path`
    #[must_use]
    pub fn with_resource(self, routes: &ResourceRoutes, path: &str) -> Self {
        let path = path.trim_end_matches('/');
        let item = format!("{path}/{{id}}");
        self.route(routes.item.clone(), item.clone())
            .route(routes.collection.clone(), path)
            .route(routes.delete.clone(), item.clone())
            .route(routes.update.clone(), item.clone())
            .route(routes.partial_update.clone(), item)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl UriBuilder for RouteTable {
    fn build(&self, route: &str, params: &[(&str, String)]) -> Result<String> {
        let template = self
            .routes
            .get(route)
            .ok_or_else(|| Error::Route(format!("unknown route '{route}'")))?;

        let mut path = String::with_capacity(template.len());
        let mut used = Vec::new();
        let mut rest = template.as_str();
        while let Some(start) = rest.find('{') {
            let end = rest[start..]
                .find('}')
                .map(|offset| start + offset)
                .ok_or_else(|| Error::Route(format!("unterminated placeholder in '{template}'")))?;
            let name = &rest[start + 1..end];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value)
                .ok_or_else(|| {
                    Error::Route(format!("missing value for '{{{name}}}' in route '{route}'"))
                })?;

            path.push_str(&rest[..start]);
            path.push_str(&urlencoding::encode(value));
            used.push(name);
            rest = &rest[end + 1..];
        }
        path.push_str(rest);

        let query: Vec<String> = params
            .iter()
            .filter(|(key, value)| !used.contains(key) && !value.is_empty())
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();

        let mut uri = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            uri.push('?');
            uri.push_str(&query.join("&"));
        }
        Ok(uri)
    }
}

/// Builds item and collection link sets for one resource
#[derive(Debug, Clone)]
pub struct LinkBuilder<U> {
    uris: U,
    routes: ResourceRoutes,
}

impl<U: UriBuilder> LinkBuilder<U> {
    pub fn new(uris: U, routes: ResourceRoutes) -> Self {
        Self { uris, routes }
    }

    pub fn routes(&self) -> &ResourceRoutes {
        &self.routes
    }

    /// URI of a single item, used for `Location` headers
    ///
    /// # Errors
    ///
    /// Propagates [`UriBuilder`] errors.
    pub fn item_uri(&self, id: &impl Display) -> Result<String> {
        self.uris.build(&self.routes.item, &[("id", id.to_string())])
    }

    /// `self` and delete links for one item
    ///
    /// The `self` link carries the field list when one was requested.
    ///
    /// # Errors
    ///
    /// Propagates [`UriBuilder`] errors.
    pub fn links_for_item(&self, id: &impl Display, fields: Option<&str>) -> Result<LinkSet> {
        let id = id.to_string();
        let mut self_params = vec![("id", id.clone())];
        if let Some(fields) = fields.filter(|f| !f.trim().is_empty()) {
            self_params.push(("fields", fields.to_string()));
        }

        Ok(LinkSet(vec![
            Link::new(self.uris.build(&self.routes.item, &self_params)?, "self", "GET"),
            Link::new(
                self.uris.build(&self.routes.delete, &[("id", id)])?,
                self.routes.delete.clone(),
                "DELETE",
            ),
        ]))
    }

    /// Collection URI for the given parameters at another page index
    ///
    /// # Errors
    ///
    /// Propagates [`UriBuilder`] errors.
    pub fn collection_uri<F: FilterParameters>(
        &self,
        params: &ResourceParameters<F>,
        page_index: i64,
    ) -> Result<String> {
        self.uris
            .build(&self.routes.collection, &params.to_query_pairs(page_index))
    }

    /// `self`, `previous_page` and `next_page` links for a collection
    ///
    /// Page indices are not range-checked here; fetching an out-of-range page
    /// yields an empty page.
    ///
    /// # Errors
    ///
    /// Propagates [`UriBuilder`] errors.
    pub fn links_for_collection<F: FilterParameters>(
        &self,
        params: &ResourceParameters<F>,
        has_previous: bool,
        has_next: bool,
    ) -> Result<LinkSet> {
        let mut links = LinkSet::new();
        links.push(Link::new(
            self.collection_uri(params, params.page_index)?,
            "self",
            "GET",
        ));
        if has_previous {
            links.push(Link::new(
                self.collection_uri(params, params.page_index - 1)?,
                "previous_page",
                "GET",
            ));
        }
        if has_next {
            links.push(Link::new(
                self.collection_uri(params, params.page_index + 1)?,
                "next_page",
                "GET",
            ));
        }
        Ok(links)
    }
}
