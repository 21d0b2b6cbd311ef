//! # Decoder
//!
//! JSON → message, driven by the target schema resolved from the registry.
//!
//! ## Algorithm
//!
//! 1. Resolve the target full name. An unbound name fails with
//!    [`CodecError::UnknownType`] before the JSON is looked at.
//! 2. Walk the schema's fields in declaration order. A field whose JSON name
//!    is absent (or `null`) is skipped; JSON members matching no field are
//!    ignored.
//! 3. Dispatch on cardinality, then on kind. Nested messages recurse with a
//!    fresh builder from the registry.
//! 4. Finalize the builder.
//!
//! Decoding is all-or-nothing: the first error aborts the call and every
//! partially filled builder is dropped. Data errors carry the JSON path of
//! the offending element, e.g. `/lines/0/sku`.

use std::fmt;

use protojson_core::{
    Cardinality, CodecError, DynamicMessage, EnumValue, FieldDescriptor, FieldKind,
    MapEntryDescriptor, MessageBuilder, Value, MAP_KEY_FIELD, MAP_VALUE_FIELD,
};
use protojson_registry::{MessageType, TypeRegistry};
use serde_json::Value as JsonValue;

use crate::leaf::{self, json_type};

/// Message nesting allowed before decoding gives up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Location inside the JSON document being decoded.
#[derive(Debug, Default)]
struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    fn push(&mut self, segment: impl ToString) {
        self.segments.push(segment.to_string());
    }

    fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

/// Schema-driven JSON decoder over a loaded registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
    max_depth: usize,
}

impl<'r> Decoder<'r> {
    /// A decoder with the default depth limit.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the message nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The registry types are resolved against.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The message type bound to `full_name`.
    pub fn resolve(&self, full_name: &str) -> Result<&'r MessageType, CodecError> {
        self.registry
            .lookup_message_type(full_name)
            .ok_or_else(|| CodecError::UnknownType(full_name.to_string()))
    }

    /// Decode `json` as an instance of the schema bound to `full_name`.
    pub fn decode(&self, json: &JsonValue, full_name: &str) -> Result<DynamicMessage, CodecError> {
        let message_type = self.resolve(full_name)?;
        self.decode_as(json, message_type)
    }

    /// Decode `json` as an instance of an already resolved type.
    pub fn decode_as(
        &self,
        json: &JsonValue,
        message_type: &MessageType,
    ) -> Result<DynamicMessage, CodecError> {
        tracing::debug!(full_name = message_type.full_name(), "decoding json to message");
        tracing::trace!(json = %json, "json content");
        self.decode_message(json, message_type, &mut JsonPath::default(), 0)
    }

    fn decode_message(
        &self,
        json: &JsonValue,
        message_type: &MessageType,
        path: &mut JsonPath,
        depth: usize,
    ) -> Result<DynamicMessage, CodecError> {
        if depth >= self.max_depth {
            return Err(CodecError::decode(
                path.to_string(),
                format!("message nesting exceeds the maximum depth of {}", self.max_depth),
            ));
        }
        let object = json.as_object().ok_or_else(|| {
            CodecError::decode(
                path.to_string(),
                format!("expected object for {}, got {}", message_type.full_name(), json_type(json)),
            )
        })?;

        let mut builder = message_type.new_builder();
        let descriptor = message_type.descriptor();
        for (index, field) in descriptor.fields().iter().enumerate() {
            let element = match object.get(field.json_name()) {
                None | Some(JsonValue::Null) => continue,
                Some(element) => element,
            };
            tracing::trace!(field = field.json_name(), "found field");
            path.push(field.json_name());
            match field.cardinality() {
                Cardinality::Singular => {
                    let value = self.decode_element(element, field.kind(), path, depth)?;
                    builder.set_field(index, value)?;
                }
                Cardinality::Repeated => {
                    for (i, item) in expect_array(element, path)?.iter().enumerate() {
                        path.push(i);
                        let value = self.decode_element(item, field.kind(), path, depth)?;
                        builder.push_repeated(index, value)?;
                        path.pop();
                    }
                }
                Cardinality::Map(entry) => {
                    self.decode_map(
                        element,
                        descriptor.full_name(),
                        field,
                        entry,
                        index,
                        &mut builder,
                        path,
                        depth,
                    )?;
                }
            }
            path.pop();
        }
        Ok(builder.build()?)
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_map(
        &self,
        json: &JsonValue,
        schema: &str,
        field: &FieldDescriptor,
        entry: &MapEntryDescriptor,
        index: usize,
        builder: &mut MessageBuilder,
        path: &mut JsonPath,
        depth: usize,
    ) -> Result<(), CodecError> {
        let (key_field, value_field) = entry.key_value().map_err(|reason| {
            tracing::error!(schema, field = field.name(), %reason, "corrupt map entry descriptor");
            CodecError::CorruptDescriptor {
                schema: schema.to_string(),
                field: field.name().to_string(),
                reason,
            }
        })?;
        for (i, item) in expect_array(json, path)?.iter().enumerate() {
            path.push(i);
            let object = item.as_object().ok_or_else(|| {
                CodecError::decode(
                    path.to_string(),
                    format!("expected map entry object, got {}", json_type(item)),
                )
            })?;
            let key = self.decode_entry_part(
                object.get(MAP_KEY_FIELD),
                key_field.kind(),
                MAP_KEY_FIELD,
                path,
                depth,
            )?;
            let value = self.decode_entry_part(
                object.get(MAP_VALUE_FIELD),
                value_field.kind(),
                MAP_VALUE_FIELD,
                path,
                depth,
            )?;
            builder.push_map_entry(index, key, value)?;
            path.pop();
        }
        Ok(())
    }

    /// Decode the `key` or `value` of a map entry; a missing part takes the
    /// default of its kind.
    fn decode_entry_part(
        &self,
        json: Option<&JsonValue>,
        kind: &FieldKind,
        member: &str,
        path: &mut JsonPath,
        depth: usize,
    ) -> Result<Value, CodecError> {
        path.push(member);
        let value = match json {
            None | Some(JsonValue::Null) => self.default_for(kind, path),
            Some(json) => self.decode_element(json, kind, path, depth),
        }?;
        path.pop();
        Ok(value)
    }

    fn decode_element(
        &self,
        json: &JsonValue,
        kind: &FieldKind,
        path: &mut JsonPath,
        depth: usize,
    ) -> Result<Value, CodecError> {
        let leaf_result = match kind {
            FieldKind::Scalar(scalar) => leaf::decode_scalar(json, *scalar),
            FieldKind::Bytes => leaf::decode_bytes(json),
            FieldKind::Enum(name) => {
                let enum_type = self
                    .registry
                    .lookup_enum_type(name)
                    .ok_or_else(|| CodecError::UnknownType(name.clone()))?;
                leaf::decode_enum(json, enum_type.descriptor())
            }
            FieldKind::Message(name) => {
                let nested = self.resolve(name)?;
                return self
                    .decode_message(json, nested, path, depth + 1)
                    .map(Value::Message);
            }
        };
        leaf_result.map_err(|reason| CodecError::decode(path.to_string(), reason))
    }

    fn default_for(&self, kind: &FieldKind, path: &JsonPath) -> Result<Value, CodecError> {
        match kind {
            FieldKind::Scalar(scalar) => Ok(Value::scalar_default(*scalar)),
            FieldKind::Bytes => Ok(Value::Bytes(Vec::new())),
            FieldKind::Enum(name) => {
                let enum_type = self
                    .registry
                    .lookup_enum_type(name)
                    .ok_or_else(|| CodecError::UnknownType(name.clone()))?;
                let constant = enum_type.descriptor().default_value().ok_or_else(|| {
                    CodecError::decode(path.to_string(), format!("enum {name} declares no constants"))
                })?;
                Ok(Value::Enum(EnumValue::new(constant.name(), constant.number())))
            }
            FieldKind::Message(name) => {
                let nested = self.resolve(name)?;
                Ok(Value::Message(nested.new_builder().build()?))
            }
        }
    }
}

fn expect_array<'j>(json: &'j JsonValue, path: &JsonPath) -> Result<&'j Vec<JsonValue>, CodecError> {
    json.as_array().ok_or_else(|| {
        CodecError::decode(path.to_string(), format!("expected array, got {}", json_type(json)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use protojson_core::{EnumDescriptor, ScalarType, SchemaDescriptor};
    use protojson_registry::NativeCatalog;
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let mut catalog = NativeCatalog::new();
        catalog
            .register_dynamic_message(
                "tree.Node",
                SchemaDescriptor::new(
                    "tree.Node",
                    vec![
                        FieldDescriptor::singular("label", FieldKind::scalar(ScalarType::String)),
                        FieldDescriptor::singular("color", FieldKind::enumeration("tree.Color")),
                        FieldDescriptor::repeated("children", FieldKind::message("tree.Node")),
                        FieldDescriptor::map(
                            "by_color",
                            MapEntryDescriptor::new(
                                "tree.Node.ByColorEntry",
                                FieldKind::scalar(ScalarType::String),
                                FieldKind::enumeration("tree.Color"),
                            ),
                        ),
                    ],
                ),
            )
            .unwrap()
            .register_dynamic_enum(
                "tree.Color",
                EnumDescriptor::new("tree.Color", [("RED", 0), ("BLACK", 1)]),
            )
            .unwrap();
        let mut builder = TypeRegistry::builder(&catalog);
        builder
            .bind_message("tree.Node", "tree.Node")
            .unwrap()
            .bind_enum("tree.Color", "tree.Color")
            .unwrap();
        builder.build()
    }

    fn chain(depth: usize) -> JsonValue {
        (0..depth).fold(json!({"label": "leaf"}), |inner, i| {
            json!({"label": format!("n{i}"), "children": [inner]})
        })
    }

    #[test]
    fn path_display_escapes_segments() {
        let mut path = JsonPath::default();
        assert_eq!(path.to_string(), "/");
        path.push("a/b");
        path.push(3);
        path.push("~x");
        assert_eq!(path.to_string(), "/a~1b/3/~0x");
    }

    #[test]
    fn errors_carry_the_json_path() {
        let registry = registry();
        let json = json!({"children": [{"label": "ok"}, {"label": 7}]});
        let err = Decoder::new(&registry).decode(&json, "tree.Node").unwrap_err();
        match err {
            CodecError::Decode { path, reason } => {
                assert_eq!(path, "/children/1/label");
                assert_eq!(reason, "expected string, got number 7");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_members_count_as_absent() {
        let registry = registry();
        let message = Decoder::new(&registry)
            .decode(&json!({"label": null, "children": null}), "tree.Node")
            .unwrap();
        assert_eq!(message.present_fields().count(), 0);
    }

    #[test]
    fn unknown_members_are_ignored() {
        let registry = registry();
        let message = Decoder::new(&registry)
            .decode(&json!({"label": "x", "extra": [1, 2]}), "tree.Node")
            .unwrap();
        assert_eq!(message.get("label"), Some(&Value::from("x")));
    }

    #[test]
    fn top_level_must_be_an_object() {
        let registry = registry();
        let err = Decoder::new(&registry).decode(&json!([1]), "tree.Node").unwrap_err();
        assert!(format!("{err}").contains("expected object for tree.Node, got array"));
    }

    #[test]
    fn nesting_beyond_limit_is_rejected() {
        let registry = registry();
        let decoder = Decoder::new(&registry).with_max_depth(4);
        assert!(decoder.decode(&chain(3), "tree.Node").is_ok());
        let err = decoder.decode(&chain(4), "tree.Node").unwrap_err();
        assert!(format!("{err}").contains("maximum depth of 4"), "{err}");
    }

    #[test]
    fn default_limit_admits_reasonable_nesting() {
        let registry = registry();
        assert!(Decoder::new(&registry).decode(&chain(40), "tree.Node").is_ok());
        assert!(Decoder::new(&registry).decode(&chain(DEFAULT_MAX_DEPTH), "tree.Node").is_err());
    }

    #[test]
    fn map_entry_missing_parts_take_defaults() {
        let registry = registry();
        let message = Decoder::new(&registry)
            .decode(&json!({"byColor": [{"key": "a"}, {"value": "BLACK"}]}), "tree.Node")
            .unwrap();
        let map = message.get("by_color").and_then(Value::as_map).unwrap();
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries[0].0, &Value::from("a"));
        assert_eq!(entries[0].1.as_enum().unwrap().name(), "RED");
        assert_eq!(entries[1].0, &Value::from(""));
        assert_eq!(entries[1].1.as_enum().unwrap().name(), "BLACK");
    }

    #[test]
    fn map_entry_must_be_an_object() {
        let registry = registry();
        let err = Decoder::new(&registry)
            .decode(&json!({"byColor": [["a", "RED"]]}), "tree.Node")
            .unwrap_err();
        match err {
            CodecError::Decode { path, .. } => assert_eq!(path, "/byColor/0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn map_given_as_object_is_rejected() {
        let registry = registry();
        let err = Decoder::new(&registry)
            .decode(&json!({"byColor": {"a": "RED"}}), "tree.Node")
            .unwrap_err();
        assert!(format!("{err}").contains("expected array, got object"));
    }
}
