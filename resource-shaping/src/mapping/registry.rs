//! Registry of property mappings keyed by (resource, entity) type pair
//!
//! The registry is populated once at startup and read without locking for the
//! rest of the process. [`init_global`] provides the one-time initialization
//! barrier; tests and embedders may also own a [`MappingRegistry`] directly.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use once_cell::sync::OnceCell;

use super::property::PropertyMapping;
use crate::error::{Error, Result};
use crate::sort::{self, SortStep};

static GLOBAL: OnceCell<MappingRegistry> = OnceCell::new();

#[derive(Debug)]
struct Registered {
    resource: &'static str,
    entity: &'static str,
    mapping: PropertyMapping,
}

/// Property mappings for every registered resource/entity pair
#[derive(Debug, Default)]
pub struct MappingRegistry {
    mappings: HashMap<(TypeId, TypeId), Registered>,
}

impl MappingRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the mapping from resource `R` to entity `E`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMapping`] if the pair is already registered.
    pub fn register<R: 'static, E: 'static>(&mut self, mapping: PropertyMapping) -> Result<()> {
        let key = (TypeId::of::<R>(), TypeId::of::<E>());
        let resource = short_type_name::<R>();
        let entity = short_type_name::<E>();

        if self.mappings.contains_key(&key) {
            return Err(Error::DuplicateMapping { resource, entity });
        }

        tracing::debug!(
            resource,
            entity,
            fields = mapping.len(),
            "Registered property mapping"
        );
        self.mappings.insert(
            key,
            Registered {
                resource,
                entity,
                mapping,
            },
        );
        Ok(())
    }

    /// Resolve the mapping from resource `R` to entity `E`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MappingNotFound`] if the pair was never registered.
    pub fn resolve<R: 'static, E: 'static>(&self) -> Result<&PropertyMapping> {
        self.mappings
            .get(&(TypeId::of::<R>(), TypeId::of::<E>()))
            .map(|registered| &registered.mapping)
            .ok_or_else(|| Error::MappingNotFound {
                resource: short_type_name::<R>(),
                entity: short_type_name::<E>(),
            })
    }

    /// Check that every field named by an `orderBy` expression is mapped
    ///
    /// Empty or absent expressions are valid. Direction suffixes other than
    /// `asc`/`desc` make the expression invalid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MappingNotFound`] if the pair was never registered.
    pub fn validate_mapping_exists<R: 'static, E: 'static>(
        &self,
        order_by: Option<&str>,
    ) -> Result<bool> {
        let mapping = self.resolve::<R, E>()?;
        let Some(order_by) = order_by else {
            return Ok(true);
        };

        let valid = match sort::parse_order_by(order_by) {
            Ok(tokens) => tokens.iter().all(|token| mapping.contains(token.field)),
            Err(_) => false,
        };
        if !valid {
            tracing::warn!(order_by, "Rejected orderBy expression");
        }
        Ok(valid)
    }

    /// Compile an `orderBy` expression against the mapping for `R` → `E`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MappingNotFound`] for an unregistered pair and
    /// [`Error::UnknownSortField`] for an unmapped field.
    pub fn compile_sort<R: 'static, E: 'static>(
        &self,
        order_by: Option<&str>,
    ) -> Result<Vec<SortStep>> {
        sort::compile_sort(order_by, self.resolve::<R, E>()?)
    }

    /// Registered (resource, entity) type names
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.mappings.values().map(|r| (r.resource, r.entity))
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no pairs are registered
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Build the process-wide registry exactly once
///
/// The first caller runs `register`; every later caller receives the registry
/// built by the first. A failing `register` leaves the barrier open so the
/// error surfaces on every attempt.
///
/// # Errors
///
/// Propagates any error returned by `register`.
pub fn init_global<F>(register: F) -> Result<&'static MappingRegistry>
where
    F: FnOnce(&mut MappingRegistry) -> Result<()>,
{
    GLOBAL.get_or_try_init(|| {
        let mut registry = MappingRegistry::new();
        register(&mut registry)?;
        tracing::info!(pairs = registry.len(), "Property mapping registry initialized");
        Ok(registry)
    })
}

/// The process-wide registry, if [`init_global`] has completed
pub fn global() -> Option<&'static MappingRegistry> {
    GLOBAL.get()
}

fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
