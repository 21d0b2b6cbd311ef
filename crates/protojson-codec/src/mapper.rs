//! # ProtoJsonMapper
//!
//! Entry point bundling the encoder and a [`Decoder`] over one registry.
//! Native Rust types go through [`encode_native`](ProtoJsonMapper::encode_native)
//! and [`decode_native`](ProtoJsonMapper::decode_native).

use protojson_core::{CodecError, DynamicMessage, NativeMessage};
use protojson_registry::TypeRegistry;
use serde_json::Value as JsonValue;

use crate::decode::Decoder;
use crate::encode::encode;

/// Converts between messages and JSON for the types of one registry.
#[derive(Debug, Clone, Copy)]
pub struct ProtoJsonMapper<'r> {
    decoder: Decoder<'r>,
}

impl<'r> ProtoJsonMapper<'r> {
    /// A mapper over `registry`.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            decoder: Decoder::new(registry),
        }
    }

    /// Replace the decode nesting limit.
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self {
            decoder: self.decoder.with_max_depth(max_depth),
        }
    }

    /// The registry types are resolved against.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.decoder.registry()
    }

    /// Encode `message` as a JSON value.
    pub fn encode(&self, message: &DynamicMessage) -> JsonValue {
        encode(message)
    }

    /// Encode `message` as pretty-printed JSON text.
    pub fn encode_to_string(&self, message: &DynamicMessage) -> String {
        format!("{:#}", encode(message))
    }

    /// Decode `json` as the schema bound to `full_name`.
    pub fn decode(&self, json: &JsonValue, full_name: &str) -> Result<DynamicMessage, CodecError> {
        self.decoder.decode(json, full_name)
    }

    /// Decode UTF-8 JSON text as the schema bound to `full_name`. The type is
    /// resolved before the input is parsed.
    pub fn decode_slice(&self, json: &[u8], full_name: &str) -> Result<DynamicMessage, CodecError> {
        let message_type = self.decoder.resolve(full_name)?;
        let text = std::str::from_utf8(json)
            .map_err(|e| CodecError::decode("/", format!("input is not valid UTF-8: {e}")))?;
        let value: JsonValue = serde_json::from_str(text)
            .map_err(|e| CodecError::decode("/", format!("malformed JSON: {e}")))?;
        self.decoder.decode_as(&value, message_type)
    }

    /// Encode a native message.
    pub fn encode_native<T: NativeMessage>(&self, value: &T) -> Result<JsonValue, CodecError> {
        Ok(encode(&value.to_message()?))
    }

    /// Decode JSON into a native message, using the schema `T` describes.
    pub fn decode_native<T: NativeMessage>(&self, json: &JsonValue) -> Result<T, CodecError> {
        let descriptor = T::descriptor();
        let message = self.decode(json, descriptor.full_name())?;
        Ok(T::from_message(&message)?)
    }
}

impl ProtoJsonMapper<'static> {
    /// A mapper over the process-global registry, if one is installed.
    pub fn from_global() -> Option<Self> {
        protojson_registry::global().map(ProtoJsonMapper::new)
    }
}
