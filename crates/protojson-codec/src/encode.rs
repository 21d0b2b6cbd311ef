//! # Encoder
//!
//! Message → JSON. Present fields are emitted in declaration order under
//! their JSON names; the output is a pure function of the input. No registry
//! is consulted: every nested message carries its own descriptor.
//!
//! Map fields are emitted as an array of `{"key": K, "value": V}` objects,
//! one per stored entry, in stored order.

use protojson_core::{DynamicMessage, Value, MAP_KEY_FIELD, MAP_VALUE_FIELD};
use serde_json::{Map, Value as JsonValue};

use crate::leaf;

/// Encode `message` as a JSON object.
pub fn encode(message: &DynamicMessage) -> JsonValue {
    let mut object = Map::new();
    for (field, value) in message.present_fields() {
        object.insert(field.json_name().to_string(), encode_value(value));
    }
    JsonValue::Object(object)
}

/// Encode one field value.
pub fn encode_value(value: &Value) -> JsonValue {
    match value {
        Value::Bytes(bytes) => leaf::encode_bytes(bytes),
        Value::Enum(constant) => leaf::encode_enum(constant),
        Value::Message(message) => encode(message),
        Value::List(items) => JsonValue::Array(items.iter().map(encode_value).collect()),
        Value::Map(map) => JsonValue::Array(
            map.iter()
                .map(|(key, value)| {
                    let mut entry = Map::with_capacity(2);
                    entry.insert(MAP_KEY_FIELD.to_string(), encode_value(key));
                    entry.insert(MAP_VALUE_FIELD.to_string(), encode_value(value));
                    JsonValue::Object(entry)
                })
                .collect(),
        ),
        Value::Bool(_)
        | Value::I32(_)
        | Value::I64(_)
        | Value::F32(_)
        | Value::F64(_)
        | Value::String(_) => leaf::encode_scalar(value).unwrap_or(JsonValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use protojson_core::{
        EnumValue, FieldDescriptor, FieldKind, MapEntryDescriptor, MessageBuilder, ScalarType,
        SchemaDescriptor,
    };
    use serde_json::json;

    fn tag_schema() -> Arc<SchemaDescriptor> {
        Arc::new(SchemaDescriptor::new(
            "blog.Tag",
            vec![FieldDescriptor::singular("label", FieldKind::scalar(ScalarType::String))],
        ))
    }

    fn post_schema() -> Arc<SchemaDescriptor> {
        Arc::new(SchemaDescriptor::new(
            "blog.Post",
            vec![
                FieldDescriptor::singular("post_id", FieldKind::scalar(ScalarType::Int64)),
                FieldDescriptor::singular("state", FieldKind::enumeration("blog.State")),
                FieldDescriptor::singular("body", FieldKind::Bytes),
                FieldDescriptor::repeated("tags", FieldKind::message("blog.Tag")),
                FieldDescriptor::map(
                    "views",
                    MapEntryDescriptor::new(
                        "blog.Post.ViewsEntry",
                        FieldKind::scalar(ScalarType::String),
                        FieldKind::scalar(ScalarType::Int32),
                    ),
                ),
            ],
        ))
    }

    fn tag(label: &str) -> DynamicMessage {
        let mut builder = MessageBuilder::new(tag_schema());
        builder.set("label", label).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn fields_follow_declaration_order_under_json_names() {
        let mut builder = MessageBuilder::new(post_schema());
        builder
            .insert("views", "eu", 3)
            .unwrap()
            .push("tags", tag("rust"))
            .unwrap()
            .set("body", vec![1u8, 2, 3])
            .unwrap()
            .set("state", EnumValue::new("PUBLISHED", 2))
            .unwrap()
            .set("post_id", 42i64)
            .unwrap();
        let json = encode(&builder.build().unwrap());

        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            r#"{"postId":42,"state":"PUBLISHED","body":{"b64":"AQID"},"tags":[{"label":"rust"}],"views":[{"key":"eu","value":3}]}"#
        );
    }

    #[test]
    fn absent_fields_are_omitted() {
        let json = encode(&DynamicMessage::default_instance(post_schema()));
        assert_eq!(json, json!({}));
    }

    #[test]
    fn duplicate_map_keys_are_all_emitted() {
        let mut builder = MessageBuilder::new(post_schema());
        builder
            .insert("views", "eu", 1)
            .unwrap()
            .insert("views", "eu", 2)
            .unwrap();
        let json = encode(&builder.build().unwrap());
        assert_eq!(
            json,
            json!({"views": [{"key": "eu", "value": 1}, {"key": "eu", "value": 2}]})
        );
    }
}
