//! # protojson-registry — Full-Name Type Bindings
//!
//! A schema descriptor knows its full name and structure but not which
//! native type implements it. This crate supplies that binding:
//!
//! - [`source`]: where binding tables live (`classpath:`/`file:` URIs) and
//!   [`RegistryConfig`], the knobs that select them.
//! - [`properties`]: the `key=value` table format.
//! - [`catalog`]: the compiled-in [`NativeCatalog`] that turns native type
//!   names into descriptors and builder factories.
//! - [`registry`]: the immutable [`TypeRegistry`], loaded once at startup.
//!
//! ## Crate Policy
//!
//! - A registry is complete or absent. Load errors are never swallowed.
//! - After load, every lookup is a read of immutable maps.

pub mod catalog;
pub mod properties;
pub mod registry;
pub mod source;

pub use catalog::{CatalogEntry, NativeCatalog, NativeMessageEntry};
pub use properties::{parse_properties, Properties};
pub use registry::{
    global, install_global, load_or_exit, EnumType, MessageType, TypeRegistry,
    TypeRegistryBuilder,
};
pub use source::{
    ClassPath, RegistryConfig, ResourceUri, DEFAULT_ENUM_TYPES_URI, DEFAULT_MESSAGE_TYPES_URI,
    DEFAULT_RESOURCE_ROOT, ENUM_TYPES_ENV, MESSAGE_TYPES_ENV, RESOURCE_ROOT_ENV,
};
