//! Runtime projection of resources into client-selected field subsets

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::fields::{split_fields, FieldLookup, Shape};

/// Ordered field-name → value map produced by [`shape`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection(IndexMap<String, Value>);

impl Projection {
    /// Create an empty projection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, keeping the first position for repeated keys
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Value of a field by canonical name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether a field is present
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying ordered map
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }
}

/// Project one item into the fields named by `fields`
///
/// An absent or empty list selects every field in declaration order.
/// Otherwise fields appear in request order under their canonical names;
/// repeats keep their first position. Dotted paths read into nested shapes
/// and are keyed by the canonical dotted path.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if a requested field does not exist.
/// Callers validate client input with
/// [`fields_exist`](crate::fields::fields_exist) first.
pub fn shape<T: Shape>(item: &T, fields: Option<&str>) -> Result<Projection> {
    let table = T::field_table();
    let mut projection = Projection::new();

    let requested: Vec<&str> = fields.map(|f| split_fields(f).collect()).unwrap_or_default();
    if requested.is_empty() {
        for accessor in table.iter() {
            projection.insert(accessor.name(), accessor.read(item));
        }
        return Ok(projection);
    }

    for field in requested {
        let mismatch = || Error::ShapeMismatch {
            shape: table.shape(),
            field: field.to_string(),
        };
        let path = table.canonical_path(field).ok_or_else(mismatch)?;
        let key = path.join(".");
        if projection.contains(&key) {
            continue;
        }

        let value = table.read_path(item, &path).ok_or_else(mismatch)?;
        projection.insert(key, value);
    }

    Ok(projection)
}

/// Project each item with the same field list, preserving order
///
/// # Errors
///
/// Returns the first [`Error::ShapeMismatch`] encountered.
pub fn shape_many<T: Shape>(items: &[T], fields: Option<&str>) -> Result<Vec<Projection>> {
    let projections = items
        .iter()
        .map(|item| shape(item, fields))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        shape = T::field_table().shape(),
        items = projections.len(),
        fields = fields.unwrap_or_default(),
        "Shaped collection"
    );
    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::test_shapes::{article, Article};

    #[test]
    fn test_all_fields_in_declaration_order() {
        let projection = shape(&article(1, "First"), None).unwrap();
        let keys: Vec<_> = projection.keys().collect();
        assert_eq!(keys, vec!["id", "title", "body", "author"]);
        assert_eq!(projection.get("id"), Some(&Value::from(1)));

        let empty = shape(&article(1, "First"), Some(" ")).unwrap();
        assert_eq!(empty.len(), 4);
    }

    #[test]
    fn test_requested_order_and_canonical_keys() {
        let projection = shape(&article(3, "Third"), Some("Title, ID")).unwrap();
        let keys: Vec<_> = projection.keys().collect();
        assert_eq!(keys, vec!["title", "id"]);
        assert_eq!(projection.get("title"), Some(&Value::from("Third")));
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let projection = shape(&article(3, "Third"), Some("id,title,ID")).unwrap();
        let keys: Vec<_> = projection.keys().collect();
        assert_eq!(keys, vec!["id", "title"]);
    }

    #[test]
    fn test_unknown_field_is_shape_mismatch() {
        let err = shape(&article(3, "Third"), Some("title,colour")).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch { shape: "Article", ref field } if field == "colour"
        ));
    }

    #[test]
    fn test_nested_path() {
        let projection = shape(&article(3, "Third"), Some("author.Name,id")).unwrap();
        assert_eq!(projection.get("author.name"), Some(&Value::from("Dave")));
        assert_eq!(projection.len(), 2);
    }

    #[test]
    fn test_nested_path_ignores_serialized_names() {
        let item = article(3, "Third");
        let serialized = serde_json::to_value(&item.author).unwrap();
        assert!(serialized.get("name").is_none());

        let projection = shape(&item, Some("author.name")).unwrap();
        assert_eq!(projection.get("author.name"), Some(&Value::from("Dave")));

        let whole = shape(&item, Some("author")).unwrap();
        assert_eq!(
            whole.get("author").and_then(|a| a.get("name")),
            Some(&Value::from("Dave"))
        );
    }

    #[test]
    fn test_shaping_twice_is_idempotent() {
        let item = article(4, "Fourth");
        for fields in [None, Some("body,ID,author.email,title")] {
            let first = shape(&item, fields).unwrap();
            let second = shape(&item, fields).unwrap();
            assert_eq!(first, second);
            assert_eq!(
                first.keys().collect::<Vec<_>>(),
                second.keys().collect::<Vec<_>>()
            );
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_shape_many_preserves_order() {
        let items: Vec<Article> = (1..=3).map(|i| article(i, &format!("T{i}"))).collect();
        let projections = shape_many(&items, Some("id")).unwrap();
        let ids: Vec<_> = projections.iter().map(|p| p.get("id").cloned()).collect();
        assert_eq!(
            ids,
            vec![Some(Value::from(1)), Some(Value::from(2)), Some(Value::from(3))]
        );
    }

    #[test]
    fn test_projection_serializes_in_order() {
        let projection = shape(&article(9, "Ninth"), Some("title,id")).unwrap();
        let json = serde_json::to_string(&projection).unwrap();
        assert_eq!(json, r#"{"title":"Ninth","id":9}"#);
    }
}
