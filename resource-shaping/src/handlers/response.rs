//! Response types for shaped resources
//!
//! Shaped items serialize as their projected fields plus a `links` array.
//! Collections come in two representations: a hypermedia envelope
//! (`{ "value": [...], "links": [...] }`) and a plain array whose navigation
//! links travel in the `X-Pagination` header instead.
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::handlers::ShapedResource;
//! use resource_shaping::links::{Link, LinkSet};
//! use resource_shaping::projection::Projection;
//!
//! let mut data = Projection::new();
//! data.insert("id", 1.into());
//! let links: LinkSet = [Link::new("/api/posts/1", "self", "GET")].into_iter().collect();
//!
//! let json = serde_json::to_string(&ShapedResource::new(data, links)).unwrap();
//! assert_eq!(json, r#"{"id":1,"links":[{"href":"/api/posts/1","rel":"self","method":"GET"}]}"#);
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::links::LinkSet;
use crate::paging::{PaginationHeader, PAGINATION_HEADER};
use crate::projection::Projection;

/// A projected resource with its links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedResource {
    #[serde(flatten)]
    pub data: Projection,
    pub links: LinkSet,
}

impl ShapedResource {
    pub fn new(data: Projection, links: LinkSet) -> Self {
        Self { data, links }
    }
}

impl IntoResponse for ShapedResource {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Hypermedia collection envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedCollection {
    pub value: Vec<ShapedResource>,
    pub links: LinkSet,
}

/// A collection body plus the `X-Pagination` header
#[derive(Debug, Clone)]
pub struct CollectionResponse<B> {
    pub body: B,
    pub pagination: PaginationHeader,
}

impl<B> CollectionResponse<B> {
    pub fn new(body: B, pagination: PaginationHeader) -> Self {
        Self { body, pagination }
    }
}

impl<B: Serialize> IntoResponse for CollectionResponse<B> {
    fn into_response(self) -> Response {
        let header = match self
            .pagination
            .to_header_value()
            .map_err(|e| e.to_string())
            .and_then(|value| HeaderValue::from_str(&value).map_err(|e| e.to_string()))
        {
            Ok(header) => header,
            Err(message) => return ApiError::internal(message).into_response(),
        };

        let mut response = (StatusCode::OK, Json(self.body)).into_response();
        response.headers_mut().insert(PAGINATION_HEADER, header);
        response
    }
}

/// `201 Created` with a `Location` header
#[derive(Debug, Clone)]
pub struct CreatedResponse<B> {
    pub location: String,
    pub body: B,
}

impl<B> CreatedResponse<B> {
    pub fn new(location: impl Into<String>, body: B) -> Self {
        Self {
            location: location.into(),
            body,
        }
    }
}

impl<B: Serialize> IntoResponse for CreatedResponse<B> {
    fn into_response(self) -> Response {
        let location = match HeaderValue::from_str(&self.location) {
            Ok(location) => location,
            Err(e) => return ApiError::internal(e.to_string()).into_response(),
        };

        let mut response = (StatusCode::CREATED, Json(self.body)).into_response();
        response.headers_mut().insert(header::LOCATION, location);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::Link;
    use crate::paging::paginate;

    fn shaped(id: i64) -> ShapedResource {
        let mut data = Projection::new();
        data.insert("id", id.into());
        data.insert("title", format!("Post Title {id}").into());
        let links = [Link::new(format!("/api/posts/{id}"), "self", "GET")]
            .into_iter()
            .collect();
        ShapedResource::new(data, links)
    }

    #[test]
    fn test_shaped_resource_flattens_projection() {
        let value = serde_json::to_value(shaped(2)).unwrap();
        assert_eq!(value["id"], 2);
        assert_eq!(value["title"], "Post Title 2");
        assert_eq!(value["links"][0]["rel"], "self");
    }

    #[test]
    fn test_shaped_collection_envelope() {
        let collection = ShapedCollection {
            value: vec![shaped(1), shaped(2)],
            links: LinkSet::new(),
        };
        let value = serde_json::to_value(collection).unwrap();
        assert_eq!(value["value"].as_array().unwrap().len(), 2);
        assert!(value["links"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_collection_response_sets_pagination_header() {
        let page = paginate(0, 5, 8, vec![1, 2, 3, 4, 5]).unwrap();
        let response =
            CollectionResponse::new(page.items().to_vec(), page.header()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let header = response.headers().get(PAGINATION_HEADER).unwrap();
        let meta: PaginationHeader = serde_json::from_slice(header.as_bytes()).unwrap();
        assert_eq!(meta.page_count, 2);
        assert_eq!(meta.total_items_count, 8);
    }

    #[test]
    fn test_created_response_sets_location() {
        let response =
            CreatedResponse::new("http://localhost/api/posts/9", shaped(9)).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            "http://localhost/api/posts/9"
        );
    }
}
