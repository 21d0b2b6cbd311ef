//! # protojson-core — Data Model for the ProtoJSON Codec
//!
//! Everything the registry and the codec share: schema descriptors, runtime
//! values, the builder/instance pair, the traits native Rust types implement,
//! and the error hierarchy. Depends on no other `protojson-*` crate.
//!
//! ## Key Design Principles
//!
//! 1. **Descriptors carry structure only.** A [`SchemaDescriptor`] names its
//!    fields, their kinds and cardinalities. Native type identity lives in the
//!    registry, never in a descriptor.
//!
//! 2. **Closed value set.** [`Value`] enumerates every runtime shape, so kind
//!    dispatch is an exhaustive `match`.
//!
//! 3. **Maps are first class.** A map field holds a [`MapValue`], an ordered
//!    list of entries. The key/value entry list is a wire concern only.
//!
//! 4. **Builders are consumed.** [`MessageBuilder::build`] takes `self`; a
//!    built [`DynamicMessage`] is immutable.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod descriptor;
pub mod descriptor_set;
pub mod error;
pub mod message;
pub mod native;
pub mod value;

pub use descriptor::{
    to_json_name, Cardinality, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldKind,
    MapEntryDescriptor, ScalarType, SchemaDescriptor, MAP_KEY_FIELD, MAP_VALUE_FIELD,
};
pub use descriptor_set::DescriptorSet;
pub use error::{BuildError, CodecError, ConfigLoadError, DescriptorSetError, ProtoJsonError};
pub use message::{DynamicMessage, Finalizer, MessageBuilder};
pub use native::{NativeEnum, NativeMessage};
pub use value::{EnumValue, MapValue, Value};
