//! Post entity, its public shapes, and the collection filter

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use resource_shaping::handlers::FieldError;
use resource_shaping::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum title length accepted on create and update
pub const TITLE_MAX_LEN: usize = 100;

/// Maximum remark length the store accepts
pub const REMARK_MAX_LEN: usize = 200;

/// Persisted post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub author: String,
    pub last_modified: DateTime<Utc>,
    pub remark: Option<String>,
}

impl PropertyOrdering for Post {
    fn compare_property(&self, other: &Self, property: &str) -> Option<Ordering> {
        match property {
            "id" => Some(self.id.cmp(&other.id)),
            "title" => Some(self.title.cmp(&other.title)),
            "body" => Some(self.body.cmp(&other.body)),
            "author" => Some(self.author.cmp(&other.author)),
            "last_modified" => Some(self.last_modified.cmp(&other.last_modified)),
            "remark" => Some(self.remark.cmp(&other.remark)),
            _ => None,
        }
    }
}

/// Public post shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResource {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub author: String,
    pub update_time: DateTime<Utc>,
    pub remark: Option<String>,
}

impl Shape for PostResource {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: Lazy<FieldTable<PostResource>> = Lazy::new(|| {
            FieldTable::<PostResource>::builder("PostResource")
                .field("id", |p| Value::from(p.id))
                .field("title", |p| Value::from(p.title.clone()))
                .field("body", |p| Value::from(p.body.clone()))
                .field("author", |p| Value::from(p.author.clone()))
                .field("update_time", |p| Value::from(p.update_time.to_rfc3339()))
                .field("remark", |p| {
                    p.remark.clone().map(Value::from).unwrap_or(Value::Null)
                })
                .build()
        });
        &TABLE
    }
}

impl Resource for PostResource {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

fn validate_title_and_body(title: &str, body: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if title.chars().count() > TITLE_MAX_LEN {
        errors.push(FieldError::new(
            "title",
            format!("Title must not exceed {TITLE_MAX_LEN} characters"),
        ));
    }
    if body.trim().is_empty() {
        errors.push(FieldError::new("body", "Body is required"));
    }
    errors
}

/// Body accepted when creating a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAddResource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub remark: Option<String>,
}

impl PostAddResource {
    /// Failed validation rules, empty when valid
    pub fn validate(&self) -> Vec<FieldError> {
        validate_title_and_body(&self.title, &self.body)
    }
}

/// Body accepted when replacing a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdateResource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub remark: Option<String>,
}

impl PostUpdateResource {
    /// Failed validation rules, empty when valid
    pub fn validate(&self) -> Vec<FieldError> {
        validate_title_and_body(&self.title, &self.body)
    }

    /// Snapshot of the updatable fields of a post
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
            remark: post.remark.clone(),
        }
    }

    /// Overwrite the updatable fields of a post
    pub fn apply_to(&self, post: &mut Post) {
        post.title = self.title.clone();
        post.body = self.body.clone();
        post.remark = self.remark.clone();
    }
}

/// Partial update; absent fields keep their current value and an explicit
/// `null` remark clears it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub remark: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl PostPatch {
    /// Apply onto an update shape
    pub fn apply(&self, target: &mut PostUpdateResource) {
        if let Some(title) = &self.title {
            target.title = title.clone();
        }
        if let Some(body) = &self.body {
            target.body = body.clone();
        }
        if let Some(remark) = &self.remark {
            target.remark = remark.clone();
        }
    }
}

/// Collection filter: case-insensitive exact title match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PostFilter {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Whether a post passes the filter
    pub fn matches(&self, post: &Post) -> bool {
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => post.title.to_lowercase() == title.to_lowercase(),
            None => true,
        }
    }
}

impl FilterParameters for PostFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        self.title
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| ("title", t.clone()))
            .collect()
    }
}
