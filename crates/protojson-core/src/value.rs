//! # Runtime Values
//!
//! [`Value`] is the closed set of shapes a field can hold at runtime. A map
//! field holds a [`MapValue`]: an ordered sequence of `(key, value)` pairs.
//!
//! ## Duplicate map keys
//!
//! A decoded map keeps every entry in input order, duplicates included.
//! Nothing is deduplicated or rejected. Point lookups ([`MapValue::get`]) and
//! [`MapValue::to_last_wins`] resolve duplicates by "last write wins", which
//! is what any consumer iterating the entries into a key→value table would
//! observe anyway.

use crate::descriptor::{FieldKind, ScalarType};
use crate::message::DynamicMessage;

/// One enum constant held by a field: symbolic name plus numeric tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    name: String,
    number: i32,
}

impl EnumValue {
    /// Create an enum value.
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }

    /// Symbolic name, emitted on the wire.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric tag.
    pub fn number(&self) -> i32 {
        self.number
    }
}

/// A field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `int32`
    I32(i32),
    /// `int64`
    I64(i64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(Vec<u8>),
    /// Enum constant.
    Enum(EnumValue),
    /// Nested message.
    Message(DynamicMessage),
    /// Contents of a repeated field.
    List(Vec<Value>),
    /// Contents of a map field.
    Map(MapValue),
}

impl Value {
    /// Short description of the value's shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// The proto3 default for a scalar type.
    pub fn scalar_default(scalar: ScalarType) -> Value {
        match scalar {
            ScalarType::Int32 => Value::I32(0),
            ScalarType::Int64 => Value::I64(0),
            ScalarType::Float => Value::F32(0.0),
            ScalarType::Double => Value::F64(0.0),
            ScalarType::Bool => Value::Bool(false),
            ScalarType::String => Value::String(String::new()),
        }
    }

    /// Whether this value equals its type's proto3 default.
    ///
    /// Messages are never default: a set message field is always present.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::I32(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::F32(v) => v.to_bits() == 0,
            Value::F64(v) => v.to_bits() == 0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Enum(e) => e.number() == 0,
            Value::Message(_) => false,
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    /// Whether this value is one element of a field of `kind`.
    pub fn matches_kind(&self, kind: &FieldKind) -> bool {
        match (kind, self) {
            (FieldKind::Scalar(ScalarType::Int32), Value::I32(_))
            | (FieldKind::Scalar(ScalarType::Int64), Value::I64(_))
            | (FieldKind::Scalar(ScalarType::Float), Value::F32(_))
            | (FieldKind::Scalar(ScalarType::Double), Value::F64(_))
            | (FieldKind::Scalar(ScalarType::Bool), Value::Bool(_))
            | (FieldKind::Scalar(ScalarType::String), Value::String(_))
            | (FieldKind::Bytes, Value::Bytes(_))
            | (FieldKind::Enum(_), Value::Enum(_)) => true,
            (FieldKind::Message(name), Value::Message(m)) => m.full_name() == name,
            _ => false,
        }
    }

    /// Returns the `bool`, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the `int32`, if this is one.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the `int64`, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the `float`, if this is one.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the `double`, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the bytes, if this is a byte sequence.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the enum constant, if this is one.
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the nested message, if this is one.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the list, if this is a repeated field's contents.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the map, if this is a map field's contents.
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<DynamicMessage> for Value {
    fn from(v: DynamicMessage) -> Self {
        Value::Message(v)
    }
}

impl From<MapValue> for Value {
    fn from(v: MapValue) -> Self {
        Value::Map(v)
    }
}

// ---------------------------------------------------------------------------
// MapValue
// ---------------------------------------------------------------------------

/// Ordered `(key, value)` entries of a map field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. An existing entry with an equal key is kept.
    pub fn push(&mut self, key: Value, value: Value) {
        self.entries.push((key, value));
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Value, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// The value of the last entry whose key equals `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether any entry has key `key`.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// A copy with one entry per distinct key, holding the last value written
    /// for it, at the position where the key first appeared.
    pub fn to_last_wins(&self) -> MapValue {
        let mut out: Vec<(Value, Value)> = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            match out.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.clone(),
                None => out.push((key.clone(), value.clone())),
            }
        }
        MapValue { entries: out }
    }

    /// Consume the map, returning its entries.
    pub fn into_entries(self) -> Vec<(Value, Value)> {
        self.entries
    }
}

impl FromIterator<(Value, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MapValue {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
