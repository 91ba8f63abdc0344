//! Field mapping registry
//!
//! Public resource field names are translated into backing entity properties
//! through per-pair [`PropertyMapping`] tables held in a [`MappingRegistry`].

mod property;
mod registry;

pub use property::{MappedProperty, PropertyMapping, PropertyMappingBuilder, IDENTITY_FIELD};
pub use registry::{global, init_global, MappingRegistry};
