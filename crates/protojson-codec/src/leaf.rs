//! # Leaf Codecs
//!
//! Conversions for values that contain no fields: scalars, byte payloads and
//! enum constants. Decoders return a plain reason on failure; the caller
//! attaches the JSON path.
//!
//! ## Byte payloads
//!
//! Bytes travel as `{"b64": "<standard base64, padded>"}`. On decode only the
//! `b64` member is read; other members are ignored.
//!
//! ## Non-finite floats
//!
//! NaN and the infinities have no JSON number form. They travel as the
//! strings `"NaN"`, `"Infinity"` and `"-Infinity"`, which float and double
//! fields also accept on decode. No other string is read as a number.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use protojson_core::{EnumDescriptor, EnumValue, ScalarType, Value};
use serde_json::{json, Number, Value as JsonValue};

/// Member of the byte payload object holding the base64 text.
pub const B64_KEY: &str = "b64";

/// JSON type name of `json`, for error messages.
pub(crate) fn json_type(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Token written for NaN, which has no JSON number form.
pub const NAN_TOKEN: &str = "NaN";
/// Token written for positive infinity.
pub const INFINITY_TOKEN: &str = "Infinity";
/// Token written for negative infinity.
pub const NEG_INFINITY_TOKEN: &str = "-Infinity";

/// Encode a double. Non-finite values become their string token.
fn encode_double(v: f64) -> JsonValue {
    match Number::from_f64(v) {
        Some(n) => JsonValue::Number(n),
        None if v.is_nan() => JsonValue::String(NAN_TOKEN.to_string()),
        None if v > 0.0 => JsonValue::String(INFINITY_TOKEN.to_string()),
        None => JsonValue::String(NEG_INFINITY_TOKEN.to_string()),
    }
}

/// Encode a float through its shortest decimal text, so `0.1f32` is written
/// as `0.1` and not as the widened double.
fn encode_float(v: f32) -> JsonValue {
    if !v.is_finite() {
        return encode_double(f64::from(v));
    }
    let shortest = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
    encode_double(shortest)
}

/// Parse a non-finite token. Any other string is not a number.
fn non_finite(token: &str) -> Option<f64> {
    match token {
        NAN_TOKEN => Some(f64::NAN),
        INFINITY_TOKEN => Some(f64::INFINITY),
        NEG_INFINITY_TOKEN => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// A float/double from a JSON number or one of the non-finite tokens.
fn decode_floating(json: &JsonValue) -> Option<f64> {
    match json {
        JsonValue::String(token) => non_finite(token),
        other => other.as_f64(),
    }
}

/// Encode a scalar value. Returns `None` for non-scalar values.
pub fn encode_scalar(value: &Value) -> Option<JsonValue> {
    let json = match value {
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::I32(v) => JsonValue::from(*v),
        Value::I64(v) => JsonValue::from(*v),
        Value::F32(v) => encode_float(*v),
        Value::F64(v) => encode_double(*v),
        Value::String(v) => JsonValue::String(v.clone()),
        _ => return None,
    };
    Some(json)
}

/// Encode a byte payload as `{"b64": ...}`.
pub fn encode_bytes(bytes: &[u8]) -> JsonValue {
    json!({ B64_KEY: STANDARD.encode(bytes) })
}

/// Encode an enum constant as its symbolic name.
pub fn encode_enum(value: &EnumValue) -> JsonValue {
    JsonValue::String(value.name().to_string())
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode a scalar of type `scalar`. No coercion between JSON types.
pub fn decode_scalar(json: &JsonValue, scalar: ScalarType) -> Result<Value, String> {
    let mismatch = || format!("expected {}, got {}", scalar.type_name(), describe(json));
    match scalar {
        ScalarType::Int32 => {
            let n = json.as_i64().ok_or_else(mismatch)?;
            i32::try_from(n)
                .map(Value::I32)
                .map_err(|_| format!("{n} is out of range for int32"))
        }
        ScalarType::Int64 => json.as_i64().map(Value::I64).ok_or_else(mismatch),
        ScalarType::Float => {
            let n = decode_floating(json).ok_or_else(mismatch)?;
            let narrowed = n as f32;
            if narrowed.is_finite() || !n.is_finite() {
                Ok(Value::F32(narrowed))
            } else {
                Err(format!("{n} is out of range for float"))
            }
        }
        ScalarType::Double => decode_floating(json).map(Value::F64).ok_or_else(mismatch),
        ScalarType::Bool => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
        ScalarType::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(mismatch),
    }
}

/// Decode a `{"b64": ...}` byte payload.
pub fn decode_bytes(json: &JsonValue) -> Result<Value, String> {
    let object = json
        .as_object()
        .ok_or_else(|| format!("expected bytes object {{\"b64\": ...}}, got {}", json_type(json)))?;
    let text = object
        .get(B64_KEY)
        .ok_or_else(|| "bytes object has no \"b64\" member".to_string())?
        .as_str()
        .ok_or_else(|| "\"b64\" member must be a string".to_string())?;
    STANDARD
        .decode(text)
        .map(Value::Bytes)
        .map_err(|e| format!("invalid base64: {e}"))
}

/// Decode an enum constant by exact, case-sensitive symbolic name.
pub fn decode_enum(json: &JsonValue, descriptor: &EnumDescriptor) -> Result<Value, String> {
    let name = json
        .as_str()
        .ok_or_else(|| format!("expected enum {} name, got {}", descriptor.full_name(), json_type(json)))?;
    let constant = descriptor
        .value_by_name(name)
        .ok_or_else(|| format!("{name:?} is not a constant of enum {}", descriptor.full_name()))?;
    Ok(Value::Enum(EnumValue::new(constant.name(), constant.number())))
}

/// `json`'s type, with the literal for numbers (so `1.5` reads as such).
fn describe(json: &JsonValue) -> String {
    match json {
        JsonValue::Number(n) => format!("number {n}"),
        other => json_type(other).to_string(),
    }
}
