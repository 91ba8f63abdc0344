//! Per-shape field accessor tables and field-list validation
//!
//! Each public resource shape implements [`Shape`] once, returning a
//! [`FieldTable`] of named accessors built at first use. The table drives
//! both validation of client field lists and projection, so the two can
//! never disagree about which fields exist.
//!
//! # Example
//!
//! ```rust
//! use once_cell::sync::Lazy;
//! use resource_shaping::fields::{fields_exist, FieldTable, Shape};
//! use serde_json::Value;
//!
//! struct Tag {
//!     id: u32,
//!     label: String,
//! }
//!
//! impl Shape for Tag {
//!     fn field_table() -> &'static FieldTable<Self> {
//!         static TABLE: Lazy<FieldTable<Tag>> = Lazy::new(|| {
//!             FieldTable::<Tag>::builder("Tag")
//!                 .field("id", |t| Value::from(t.id))
//!                 .field("label", |t| Value::from(t.label.clone()))
//!                 .build()
//!         });
//!         &TABLE
//!     }
//! }
//!
//! assert!(fields_exist::<Tag>(Some("Label, id")));
//! assert!(!fields_exist::<Tag>(Some("colour")));
//! ```

use serde_json::Value;

use crate::error::{Error, Result};

/// Reads one field of a shape as a JSON value
pub type FieldReader<T> = fn(&T) -> Value;

/// Reads a field, then follows the remaining path segments into it
type PathReader<T> = Box<dyn Fn(&T, &[&str]) -> Option<Value> + Send + Sync>;

/// Type-erased view of a field table, used to follow dotted paths
pub trait FieldLookup: Send + Sync {
    /// Shape type name used in errors
    fn shape_name(&self) -> &'static str;

    /// Canonical spelling of a dotted field path, matched case-insensitively
    fn canonical_path(&self, path: &str) -> Option<Vec<&'static str>>;

    /// Whether a dotted field path exists on the shape
    fn has_path(&self, path: &str) -> bool {
        self.canonical_path(path).is_some()
    }
}

/// A named accessor for one public field
pub struct FieldAccessor<T> {
    name: &'static str,
    read: PathReader<T>,
    nested: Option<&'static dyn FieldLookup>,
}

impl<T> FieldAccessor<T> {
    /// Canonical field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field from an item
    pub fn read(&self, item: &T) -> Value {
        (self.read)(item, &[]).unwrap_or(Value::Null)
    }

    /// Read the field, then the canonical sub-path `rest` of a nested shape
    ///
    /// `None` when `rest` names no field of the nested shape.
    pub fn read_path(&self, item: &T, rest: &[&str]) -> Option<Value> {
        (self.read)(item, rest)
    }

    /// Nested shape reachable through this field, if any
    pub fn nested(&self) -> Option<&'static dyn FieldLookup> {
        self.nested
    }
}

impl<T> std::fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("name", &self.name)
            .field("nested", &self.nested.map(|nested| nested.shape_name()))
            .finish()
    }
}

/// Ordered accessor table for a shape
#[derive(Debug)]
pub struct FieldTable<T> {
    shape: &'static str,
    fields: Vec<FieldAccessor<T>>,
}

impl<T> FieldTable<T> {
    /// Start building a table for the named shape
    #[must_use]
    pub fn builder(shape: &'static str) -> FieldTableBuilder<T> {
        FieldTableBuilder {
            table: FieldTable {
                shape,
                fields: Vec::new(),
            },
        }
    }

    /// Shape type name
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    /// Accessor for a top-level field, matched case-insensitively
    pub fn accessor(&self, field: &str) -> Option<&FieldAccessor<T>> {
        self.fields
            .iter()
            .find(|accessor| accessor.name.eq_ignore_ascii_case(field))
    }

    /// Accessors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldAccessor<T>> {
        self.fields.iter()
    }

    /// Field names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|accessor| accessor.name)
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the table declares no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read a canonical field path from an item
    ///
    /// An empty path reads every field into an object.
    pub fn read_path(&self, item: &T, path: &[&str]) -> Option<Value> {
        match path.split_first() {
            None => Some(Value::Object(
                self.fields
                    .iter()
                    .map(|accessor| (accessor.name.to_string(), accessor.read(item)))
                    .collect(),
            )),
            Some((head, rest)) => self.accessor(head)?.read_path(item, rest),
        }
    }
}

impl<T> FieldLookup for FieldTable<T> {
    fn shape_name(&self) -> &'static str {
        self.shape
    }

    fn canonical_path(&self, path: &str) -> Option<Vec<&'static str>> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let accessor = self.accessor(head.trim())?;

        match rest {
            None => Some(vec![accessor.name]),
            Some(rest) => {
                let mut segments = accessor.nested?.canonical_path(rest)?;
                segments.insert(0, accessor.name);
                Some(segments)
            }
        }
    }
}

/// Builder for [`FieldTable`]
pub struct FieldTableBuilder<T> {
    table: FieldTable<T>,
}

impl<T: 'static> FieldTableBuilder<T> {
    /// Declare a scalar field
    #[must_use]
    pub fn field(mut self, name: &'static str, read: FieldReader<T>) -> Self {
        self.table.fields.push(FieldAccessor {
            name,
            read: Box::new(move |item: &T, rest: &[&str]| rest.is_empty().then(|| read(item))),
            nested: None,
        });
        self
    }

    /// Declare a field whose value is itself a shape reachable by dotted paths
    ///
    /// Nested values are read through `N`'s own accessors.
    #[must_use]
    pub fn nested<N: Shape>(mut self, name: &'static str, get: fn(&T) -> &N) -> Self {
        let table = N::field_table();
        self.table.fields.push(FieldAccessor {
            name,
            read: Box::new(move |item: &T, rest: &[&str]| table.read_path(get(item), rest)),
            nested: Some(table),
        });
        self
    }

    /// Finish the table
    #[must_use]
    pub fn build(self) -> FieldTable<T> {
        self.table
    }
}

/// A public resource shape with a static field accessor table
pub trait Shape: Sized + 'static {
    /// The accessor table, built once per type
    fn field_table() -> &'static FieldTable<Self>;
}

/// A shape addressable by identity, so its links can be built even when the
/// client's field list leaves the identity out
pub trait Resource: Shape {
    type Id: std::fmt::Display;

    fn id(&self) -> Self::Id;
}

/// Split a comma-separated field list into trimmed, non-empty tokens
pub fn split_fields(fields: &str) -> impl Iterator<Item = &str> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Whether every field in a client field list exists on shape `T`
///
/// Absent or empty lists are valid and mean "all fields".
pub fn fields_exist<T: Shape>(fields: Option<&str>) -> bool {
    ensure_fields_exist::<T>(fields).is_ok()
}

/// Validate a client field list against shape `T`
///
/// # Errors
///
/// Returns [`Error::UnknownField`] naming the first field that does not exist.
pub fn ensure_fields_exist<T: Shape>(fields: Option<&str>) -> Result<()> {
    let table = T::field_table();
    let Some(fields) = fields else {
        return Ok(());
    };

    match split_fields(fields).find(|field| !table.has_path(field)) {
        Some(unknown) => {
            tracing::warn!(shape = table.shape(), field = unknown, "Rejected field list");
            Err(Error::UnknownField {
                shape: table.shape(),
                field: unknown.to_string(),
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod test_shapes {
    use once_cell::sync::Lazy;
    use serde::Serialize;
    use serde_json::Value;

    use super::{FieldTable, Shape};

    #[derive(Debug, Clone, Serialize)]
    pub struct Author {
        #[serde(rename = "full_name")]
        pub name: String,
        pub email: String,
    }

    impl Shape for Author {
        fn field_table() -> &'static FieldTable<Self> {
            static TABLE: Lazy<FieldTable<Author>> = Lazy::new(|| {
                FieldTable::<Author>::builder("Author")
                    .field("name", |a| Value::from(a.name.clone()))
                    .field("email", |a| Value::from(a.email.clone()))
                    .build()
            });
            &TABLE
        }
    }

    #[derive(Debug, Clone)]
    pub struct Article {
        pub id: u32,
        pub title: String,
        pub body: String,
        pub author: Author,
    }

    impl Shape for Article {
        fn field_table() -> &'static FieldTable<Self> {
            static TABLE: Lazy<FieldTable<Article>> = Lazy::new(|| {
                FieldTable::<Article>::builder("Article")
                    .field("id", |a| Value::from(a.id))
                    .field("title", |a| Value::from(a.title.clone()))
                    .field("body", |a| Value::from(a.body.clone()))
                    .nested::<Author>("author", |a| &a.author)
                    .build()
            });
            &TABLE
        }
    }

    impl super::Resource for Article {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    pub fn article(id: u32, title: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            body: format!("Body of {title}"),
            author: Author {
                name: "Dave".to_string(),
                email: "dave@example.com".to_string(),
            },
        }
    }
}
