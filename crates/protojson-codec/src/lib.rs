//! # protojson-codec — Message ⇄ JSON
//!
//! Generic, descriptor-driven conversion between [`DynamicMessage`]s and
//! JSON. No per-message code: the schema drives both directions.
//!
//! ## Wire shapes
//!
//! | Kind | JSON |
//! |---|---|
//! | int32 / int64 / float / double / bool | number / bool |
//! | string | string |
//! | bytes | `{"b64": "<base64>"}` |
//! | enum | symbolic name string |
//! | message | object keyed by field JSON name |
//! | repeated T | array of T |
//! | map<K, V> | array of `{"key": K, "value": V}` |
//!
//! Decoding always names its target schema; the JSON itself carries no type
//! information.
//!
//! [`DynamicMessage`]: protojson_core::DynamicMessage

pub mod decode;
pub mod encode;
pub mod leaf;
pub mod mapper;

pub use decode::{Decoder, DEFAULT_MAX_DEPTH};
pub use encode::{encode, encode_value};
pub use mapper::ProtoJsonMapper;
