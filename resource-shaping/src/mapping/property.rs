//! Property mapping tables
//!
//! A [`PropertyMapping`] translates each public field name of a resource into
//! the ordered backing properties of an entity. One public name may expand
//! into several properties, and each property may be flagged as reversed so
//! that ascending on the public field sorts that property descending.
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::mapping::{MappedProperty, PropertyMapping};
//!
//! let mapping = PropertyMapping::builder()
//!     .field("title")
//!     .map("name", [MappedProperty::new("first_name"), MappedProperty::new("last_name")])
//!     .map("freshness", [MappedProperty::reversed("last_modified")])
//!     .build();
//!
//! assert_eq!(mapping.get("NAME").map(<[_]>::len), Some(2));
//! assert!(mapping.contains("id"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default identity field present in every mapping table
pub const IDENTITY_FIELD: &str = "id";

/// A backing property reference plus a direction-reversal flag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedProperty {
    /// Backing entity property name
    pub name: String,
    /// Sort this property opposite to the requested direction
    pub reversed: bool,
}

impl MappedProperty {
    /// Property sorted in the requested direction
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reversed: false,
        }
    }

    /// Property sorted opposite to the requested direction
    pub fn reversed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reversed: true,
        }
    }
}

/// Immutable public-field → backing-properties table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMapping {
    identity: String,
    table: IndexMap<String, Vec<MappedProperty>>,
}

impl PropertyMapping {
    /// Start a table whose identity field is `id`
    #[must_use]
    pub fn builder() -> PropertyMappingBuilder {
        Self::with_identity(IDENTITY_FIELD)
    }

    /// Start a table with a custom identity field
    #[must_use]
    pub fn with_identity(identity: impl Into<String>) -> PropertyMappingBuilder {
        PropertyMappingBuilder {
            identity: identity.into(),
            table: IndexMap::new(),
        }
    }

    /// Identity field name
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Backing properties for a public field, matched case-insensitively
    pub fn get(&self, field: &str) -> Option<&[MappedProperty]> {
        self.entry(field).map(|(_, props)| props)
    }

    /// Canonical key and backing properties for a public field
    pub fn entry(&self, field: &str) -> Option<(&str, &[MappedProperty])> {
        if let Some((key, props)) = self.table.get_key_value(field) {
            return Some((key.as_str(), props.as_slice()));
        }
        self.table
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(key, props)| (key.as_str(), props.as_slice()))
    }

    /// Whether a public field is mapped, matched case-insensitively
    pub fn contains(&self, field: &str) -> bool {
        self.entry(field).is_some()
    }

    /// Public field names in registration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Number of public fields, identity included
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always false once built, as the identity entry is implicit
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Builder for [`PropertyMapping`]
#[derive(Debug, Clone)]
pub struct PropertyMappingBuilder {
    identity: String,
    table: IndexMap<String, Vec<MappedProperty>>,
}

impl PropertyMappingBuilder {
    /// Map a public field to its backing properties
    #[must_use]
    pub fn map(
        mut self,
        field: impl Into<String>,
        properties: impl IntoIterator<Item = MappedProperty>,
    ) -> Self {
        self.table
            .insert(field.into(), properties.into_iter().collect());
        self
    }

    /// Map a public field to a same-named backing property
    #[must_use]
    pub fn field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        let property = MappedProperty::new(field.clone());
        self.map(field, [property])
    }

    /// Finish the table, adding the identity entry
    #[must_use]
    pub fn build(mut self) -> PropertyMapping {
        let identity = self.identity.clone();
        self.table
            .insert(identity.clone(), vec![MappedProperty::new(identity)]);
        PropertyMapping {
            identity: self.identity,
            table: self.table,
        }
    }
}
