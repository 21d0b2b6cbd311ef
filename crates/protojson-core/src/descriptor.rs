//! # Schema Descriptors
//!
//! Structural description of message and enum types: field names, kinds,
//! cardinalities, and references to other schemas by full name. Descriptors
//! carry no native type identity; the type registry supplies that.
//!
//! ## Field shapes
//!
//! Every field is a [`FieldKind`] (what one element looks like) combined with
//! a [`Cardinality`] (how many elements there are):
//!
//! | Kind | Singular | Repeated | Map |
//! |---|---|---|---|
//! | scalar / bytes / enum / message | one value | ordered list | ordered `(key, value)` entries |
//!
//! Map fields reference a synthetic [`MapEntryDescriptor`] whose two fields
//! must be named `key` then `value`. This is not enforced on construction. A
//! descriptor loaded from a file can violate it, and the decoder then reports
//! a corrupt descriptor rather than a data error.
//!
//! ## Ordering
//!
//! Field order is declaration order. It drives traversal and the order of
//! keys in encoded JSON, so it must be stable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// JSON name of the first field of a map entry.
pub const MAP_KEY_FIELD: &str = "key";

/// JSON name of the second field of a map entry.
pub const MAP_VALUE_FIELD: &str = "value";

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Scalar subtypes supported by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
}

impl ScalarType {
    /// Returns the protobuf type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
        }
    }
}

/// The shape of one element of a field.
///
/// Serialized as `"int32"`, `"bytes"`, `{"enum": "pkg.Status"}` or
/// `{"message": "pkg.Order"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Opaque byte sequence.
    Bytes,
    /// Enum, by enum full name.
    Enum(String),
    /// Nested message, by schema full name.
    Message(String),
    /// Scalar value.
    #[serde(untagged)]
    Scalar(ScalarType),
}

impl FieldKind {
    /// Shorthand for a scalar kind.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldKind::Scalar(scalar)
    }

    /// Shorthand for an enum kind.
    pub fn enumeration(full_name: impl Into<String>) -> Self {
        FieldKind::Enum(full_name.into())
    }

    /// Shorthand for a message kind.
    pub fn message(full_name: impl Into<String>) -> Self {
        FieldKind::Message(full_name.into())
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(s) => f.write_str(s.type_name()),
            FieldKind::Bytes => f.write_str("bytes"),
            FieldKind::Enum(name) => write!(f, "enum {name}"),
            FieldKind::Message(name) => write!(f, "message {name}"),
        }
    }
}

/// How many elements a field holds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// At most one value.
    #[default]
    Singular,
    /// Ordered list of values.
    Repeated,
    /// Ordered list of `(key, value)` entries.
    Map(MapEntryDescriptor),
}

impl Cardinality {
    fn is_singular(&self) -> bool {
        matches!(self, Cardinality::Singular)
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Describes one field of a message schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr", into = "FieldRepr")]
pub struct FieldDescriptor {
    name: String,
    json_name: String,
    json_name_explicit: bool,
    kind: FieldKind,
    cardinality: Cardinality,
    explicit_presence: bool,
}

impl FieldDescriptor {
    /// Create a field. The JSON name defaults to the lowerCamelCase form of `name`.
    pub fn new(name: impl Into<String>, kind: FieldKind, cardinality: Cardinality) -> Self {
        let name = name.into();
        Self {
            json_name: to_json_name(&name),
            json_name_explicit: false,
            name,
            kind,
            cardinality,
            explicit_presence: false,
        }
    }

    /// Create a singular field.
    pub fn singular(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Cardinality::Singular)
    }

    /// Create a repeated field.
    pub fn repeated(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Cardinality::Repeated)
    }

    /// Create a map field backed by `entry`.
    pub fn map(name: impl Into<String>, entry: MapEntryDescriptor) -> Self {
        let kind = FieldKind::Message(entry.full_name.clone());
        Self::new(name, kind, Cardinality::Map(entry))
    }

    /// Override the JSON name.
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self.json_name_explicit = true;
        self
    }

    /// Mark the field as having explicit presence (proto3 `optional`):
    /// a value set to its default is still reported as present.
    pub fn with_explicit_presence(mut self) -> Self {
        self.explicit_presence = true;
        self
    }

    /// The field name as declared in the schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key used for this field in JSON.
    pub fn json_name(&self) -> &str {
        &self.json_name
    }

    /// The element kind. For map fields this is the entry message.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The cardinality.
    pub fn cardinality(&self) -> &Cardinality {
        &self.cardinality
    }

    /// Whether a default value still counts as present.
    pub fn has_explicit_presence(&self) -> bool {
        self.explicit_presence
    }

    /// True for `repeated` (non-map) fields.
    pub fn is_repeated(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated)
    }

    /// True for map fields.
    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map(_))
    }

    /// The map entry descriptor, for map fields.
    pub fn map_entry(&self) -> Option<&MapEntryDescriptor> {
        match &self.cardinality {
            Cardinality::Map(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Serde form of [`FieldDescriptor`]. `kind` may be omitted on map fields.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldRepr {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    json_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Cardinality::is_singular")]
    cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    optional: bool,
}

impl TryFrom<FieldRepr> for FieldDescriptor {
    type Error = String;

    fn try_from(repr: FieldRepr) -> Result<Self, Self::Error> {
        let mut field = match repr.cardinality {
            Cardinality::Map(entry) => FieldDescriptor::map(repr.name, entry),
            cardinality => {
                let kind = repr
                    .kind
                    .ok_or_else(|| format!("field {:?} declares no kind", repr.name))?;
                FieldDescriptor::new(repr.name, kind, cardinality)
            }
        };
        if let Some(json_name) = repr.json_name {
            field = field.with_json_name(json_name);
        }
        if repr.optional {
            field = field.with_explicit_presence();
        }
        Ok(field)
    }
}

impl From<FieldDescriptor> for FieldRepr {
    fn from(field: FieldDescriptor) -> Self {
        let kind = if field.is_map() { None } else { Some(field.kind) };
        FieldRepr {
            name: field.name,
            json_name: field.json_name_explicit.then_some(field.json_name),
            kind,
            cardinality: field.cardinality,
            optional: field.explicit_presence,
        }
    }
}

/// Convert a declared field name to its JSON name (`order_id` → `orderId`).
///
/// Follows protoc: underscores are dropped and the following character is
/// upper-cased; everything else is kept as written.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut capitalize_next = false;
    for c in name.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Map entries
// ---------------------------------------------------------------------------

/// The synthetic two-field message describing one entry of a map field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MapEntryRepr", into = "MapEntryRepr")]
pub struct MapEntryDescriptor {
    full_name: String,
    fields: Vec<FieldDescriptor>,
}

impl MapEntryDescriptor {
    /// Create a well-formed entry with `key` and `value` fields.
    pub fn new(full_name: impl Into<String>, key: FieldKind, value: FieldKind) -> Self {
        Self {
            full_name: full_name.into(),
            fields: vec![
                FieldDescriptor::singular(MAP_KEY_FIELD, key),
                FieldDescriptor::singular(MAP_VALUE_FIELD, value),
            ],
        }
    }

    /// Create an entry from arbitrary fields. No invariant is checked here.
    pub fn from_fields(full_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            full_name: full_name.into(),
            fields,
        }
    }

    /// Full name of the entry message.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The declared fields, in order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the `(key, value)` fields, or why the entry is malformed.
    ///
    /// A well-formed entry has exactly two fields whose JSON names are
    /// `key` and `value`, in that order.
    pub fn key_value(&self) -> Result<(&FieldDescriptor, &FieldDescriptor), String> {
        let [key, value] = self.fields.as_slice() else {
            let listing = self
                .fields
                .iter()
                .map(|f| format!("{} ({})", f.json_name(), f.kind()))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(format!(
                "map entry {} has {} fields, expected 2 [{listing}]",
                self.full_name,
                self.fields.len()
            ));
        };
        if key.json_name() != MAP_KEY_FIELD {
            return Err(format!(
                "first map entry field must be named 'key', found {:?}",
                key.json_name()
            ));
        }
        if value.json_name() != MAP_VALUE_FIELD {
            return Err(format!(
                "second map entry field must be named 'value', found {:?}",
                value.json_name()
            ));
        }
        Ok((key, value))
    }
}

/// Serde form of [`MapEntryDescriptor`]: either the full field list or the
/// `{key, value}` shorthand.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MapEntryRepr {
    Full {
        full_name: String,
        fields: Vec<FieldDescriptor>,
    },
    Short {
        #[serde(default = "default_entry_name")]
        full_name: String,
        key: FieldKind,
        value: FieldKind,
    },
}

fn default_entry_name() -> String {
    "MapEntry".to_string()
}

impl From<MapEntryRepr> for MapEntryDescriptor {
    fn from(repr: MapEntryRepr) -> Self {
        match repr {
            MapEntryRepr::Full { full_name, fields } => Self::from_fields(full_name, fields),
            MapEntryRepr::Short {
                full_name,
                key,
                value,
            } => Self::new(full_name, key, value),
        }
    }
}

impl From<MapEntryDescriptor> for MapEntryRepr {
    fn from(entry: MapEntryDescriptor) -> Self {
        MapEntryRepr::Full {
            full_name: entry.full_name,
            fields: entry.fields,
        }
    }
}

// ---------------------------------------------------------------------------
// Messages and enums
// ---------------------------------------------------------------------------

/// Structural description of one message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    full_name: String,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Create a schema with fields in declaration order.
    pub fn new(full_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            full_name: full_name.into(),
            fields,
        }
    }

    /// Globally unique full name, e.g. `shop.Order`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field at `index`.
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Position of the field declared as `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Field declared as `name`.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Field whose JSON name is `json_name`.
    pub fn field_by_json_name(&self, json_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.json_name() == json_name)
    }

    /// Full names of every message and enum referenced by this schema,
    /// including those reached through map entries.
    pub fn references(&self) -> Vec<&FieldKind> {
        let mut out = Vec::new();
        for field in &self.fields {
            match field.map_entry() {
                Some(entry) => out.extend(
                    entry
                        .fields()
                        .iter()
                        .map(FieldDescriptor::kind)
                        .filter(|k| matches!(k, FieldKind::Enum(_) | FieldKind::Message(_))),
                ),
                None => {
                    if matches!(field.kind(), FieldKind::Enum(_) | FieldKind::Message(_)) {
                        out.push(field.kind());
                    }
                }
            }
        }
        out
    }
}

/// One symbolic constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    name: String,
    number: i32,
}

impl EnumValueDescriptor {
    /// Create an enum constant.
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }

    /// Declared symbolic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric tag.
    pub fn number(&self) -> i32 {
        self.number
    }
}

/// Structural description of one enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    full_name: String,
    values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    /// Create an enum from `(name, number)` pairs in declaration order.
    pub fn new<N: Into<String>>(
        full_name: impl Into<String>,
        values: impl IntoIterator<Item = (N, i32)>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            values: values
                .into_iter()
                .map(|(name, number)| EnumValueDescriptor::new(name, number))
                .collect(),
        }
    }

    /// Globally unique full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Declared constants.
    pub fn values(&self) -> &[EnumValueDescriptor] {
        &self.values
    }

    /// Case-sensitive lookup by symbolic name.
    pub fn value_by_name(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Lookup by numeric tag. With aliases, the first declared constant wins.
    pub fn value_by_number(&self, number: i32) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.number == number)
    }

    /// The default constant: the first one declared.
    pub fn default_value(&self) -> Option<&EnumValueDescriptor> {
        self.values.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_name_follows_protoc_rules() {
        assert_eq!(to_json_name("order_id"), "orderId");
        assert_eq!(to_json_name("status"), "status");
        assert_eq!(to_json_name("line_item_count"), "lineItemCount");
        assert_eq!(to_json_name("_private"), "Private");
        assert_eq!(to_json_name("trailing_"), "trailing");
        assert_eq!(to_json_name("already_Camel"), "alreadyCamel");
    }

    #[test]
    fn explicit_json_name_overrides_default() {
        let field = FieldDescriptor::singular("order_id", FieldKind::scalar(ScalarType::Int64))
            .with_json_name("id");
        assert_eq!(field.name(), "order_id");
        assert_eq!(field.json_name(), "id");
    }

    #[test]
    fn map_field_kind_points_at_entry() {
        let entry = MapEntryDescriptor::new(
            "shop.Order.CountsEntry",
            FieldKind::scalar(ScalarType::String),
            FieldKind::scalar(ScalarType::Int32),
        );
        let field = FieldDescriptor::map("counts", entry);
        assert!(field.is_map());
        assert!(!field.is_repeated());
        assert_eq!(
            field.kind(),
            &FieldKind::message("shop.Order.CountsEntry")
        );
        assert!(field.map_entry().unwrap().key_value().is_ok());
    }

    #[test]
    fn map_entry_with_three_fields_is_corrupt() {
        let entry = MapEntryDescriptor::from_fields(
            "bad.Entry",
            vec![
                FieldDescriptor::singular("key", FieldKind::scalar(ScalarType::String)),
                FieldDescriptor::singular("value", FieldKind::scalar(ScalarType::Int32)),
                FieldDescriptor::singular("extra", FieldKind::scalar(ScalarType::Bool)),
            ],
        );
        let err = entry.key_value().unwrap_err();
        assert!(err.contains("3 fields"), "{err}");
        assert!(err.contains("extra"), "{err}");
    }

    #[test]
    fn map_entry_with_swapped_names_is_corrupt() {
        let entry = MapEntryDescriptor::from_fields(
            "bad.Entry",
            vec![
                FieldDescriptor::singular("value", FieldKind::scalar(ScalarType::Int32)),
                FieldDescriptor::singular("key", FieldKind::scalar(ScalarType::String)),
            ],
        );
        let err = entry.key_value().unwrap_err();
        assert!(err.contains("'key'"), "{err}");
    }

    #[test]
    fn field_kind_serde_shapes() {
        let scalar: FieldKind = serde_json::from_str(r#""int32""#).unwrap();
        assert_eq!(scalar, FieldKind::scalar(ScalarType::Int32));
        let bytes: FieldKind = serde_json::from_str(r#""bytes""#).unwrap();
        assert_eq!(bytes, FieldKind::Bytes);
        let en: FieldKind = serde_json::from_str(r#"{"enum":"shop.Status"}"#).unwrap();
        assert_eq!(en, FieldKind::enumeration("shop.Status"));
        let msg: FieldKind = serde_json::from_str(r#"{"message":"shop.Line"}"#).unwrap();
        assert_eq!(msg, FieldKind::message("shop.Line"));
        assert_eq!(
            serde_json::to_string(&FieldKind::scalar(ScalarType::Double)).unwrap(),
            r#""double""#
        );
    }

    #[test]
    fn field_without_kind_is_rejected() {
        let result: Result<FieldDescriptor, _> = serde_json::from_str(r#"{"name":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn map_field_shorthand_deserializes() {
        let field: FieldDescriptor = serde_json::from_str(
            r#"{"name":"counts","cardinality":{"map":{"key":"string","value":"int32"}}}"#,
        )
        .unwrap();
        let (key, value) = field.map_entry().unwrap().key_value().unwrap();
        assert_eq!(key.kind(), &FieldKind::scalar(ScalarType::String));
        assert_eq!(value.kind(), &FieldKind::scalar(ScalarType::Int32));
    }

    #[test]
    fn schema_descriptor_serde_preserves_field_order() {
        let schema = SchemaDescriptor::new(
            "shop.Line",
            vec![
                FieldDescriptor::singular("sku", FieldKind::scalar(ScalarType::String)),
                FieldDescriptor::singular("qty", FieldKind::scalar(ScalarType::Int32))
                    .with_explicit_presence(),
                FieldDescriptor::repeated("notes", FieldKind::scalar(ScalarType::String)),
            ],
        );
        let text = serde_json::to_string(&schema).unwrap();
        let back: SchemaDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(back, schema);
        let names: Vec<_> = back.fields().iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["sku", "qty", "notes"]);
        assert!(back.fields()[1].has_explicit_presence());
    }

    #[test]
    fn schema_lookup_helpers() {
        let schema = SchemaDescriptor::new(
            "shop.Customer",
            vec![
                FieldDescriptor::singular("display_name", FieldKind::scalar(ScalarType::String)),
                FieldDescriptor::singular("tier", FieldKind::enumeration("shop.Tier")),
            ],
        );
        assert_eq!(schema.index_of("tier"), Some(1));
        assert!(schema.field_by_json_name("displayName").is_some());
        assert!(schema.field_by_name("displayName").is_none());
        assert_eq!(schema.references(), vec![&FieldKind::enumeration("shop.Tier")]);
    }

    #[test]
    fn enum_lookup_is_case_sensitive() {
        let status = EnumDescriptor::new(
            "shop.Status",
            [("STATUS_UNKNOWN", 0), ("PAID", 1), ("SHIPPED", 2)],
        );
        assert_eq!(status.value_by_name("PAID").unwrap().number(), 1);
        assert!(status.value_by_name("paid").is_none());
        assert_eq!(status.value_by_number(2).unwrap().name(), "SHIPPED");
        assert_eq!(status.default_value().unwrap().name(), "STATUS_UNKNOWN");
    }
}
