//! # Messages and Builders
//!
//! A [`MessageBuilder`] stages field values for one schema and checks each
//! value against the field's declared shape as it is staged. [`build`]
//! consumes the builder and moves the staged values into an immutable
//! [`DynamicMessage`]; no aliasing between the two remains.
//!
//! ## Presence
//!
//! Staging a proto3 default into a field without explicit presence clears
//! the field, exactly as a generated proto3 builder would. Consequently a
//! [`DynamicMessage`] only holds values that are present, and
//! [`DynamicMessage::present_fields`] is a plain walk over the occupied slots
//! in declaration order.
//!
//! [`build`]: MessageBuilder::build

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{Cardinality, FieldDescriptor, SchemaDescriptor};
use crate::error::BuildError;
use crate::value::{MapValue, Value};

/// Check run by [`MessageBuilder::build`] on the finalized instance. Used by
/// native types to prove they can be constructed from it.
pub type Finalizer = Arc<dyn Fn(&DynamicMessage) -> Result<(), BuildError> + Send + Sync>;

// ---------------------------------------------------------------------------
// DynamicMessage
// ---------------------------------------------------------------------------

/// An immutable message instance of a known schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: Arc<SchemaDescriptor>,
    values: Vec<Option<Value>>,
}

impl DynamicMessage {
    /// A message with every field unset.
    pub fn default_instance(descriptor: Arc<SchemaDescriptor>) -> Self {
        let values = vec![None; descriptor.fields().len()];
        Self { descriptor, values }
    }

    /// The schema of this message.
    pub fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    /// Shared handle to the schema of this message.
    pub fn descriptor_arc(&self) -> &Arc<SchemaDescriptor> {
        &self.descriptor
    }

    /// Full name of the schema.
    pub fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    /// Value of the field declared as `name`, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.descriptor.index_of(name)?;
        self.get_at(index)
    }

    /// Value of the field at `index`, if present.
    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Whether the field declared as `name` is present.
    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Present fields in declaration order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> + '_ {
        self.descriptor
            .fields()
            .iter()
            .zip(&self.values)
            .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)))
    }

    /// Start a builder pre-populated with this message's values.
    pub fn into_builder(self) -> MessageBuilder {
        MessageBuilder {
            descriptor: self.descriptor,
            values: self.values,
            finalizer: None,
        }
    }
}

// ---------------------------------------------------------------------------
// MessageBuilder
// ---------------------------------------------------------------------------

/// Mutable staging area for one message.
#[derive(Clone)]
pub struct MessageBuilder {
    descriptor: Arc<SchemaDescriptor>,
    values: Vec<Option<Value>>,
    finalizer: Option<Finalizer>,
}

impl fmt::Debug for MessageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("schema", &self.descriptor.full_name())
            .field("staged", &self.values.iter().filter(|v| v.is_some()).count())
            .field("has_finalizer", &self.finalizer.is_some())
            .finish()
    }
}

impl MessageBuilder {
    /// A builder with every field unset.
    pub fn new(descriptor: Arc<SchemaDescriptor>) -> Self {
        let values = vec![None; descriptor.fields().len()];
        Self {
            descriptor,
            values,
            finalizer: None,
        }
    }

    /// Attach a check that [`build`](Self::build) runs on the finished instance.
    pub fn with_finalizer(mut self, finalizer: Finalizer) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    /// The schema being built.
    pub fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    /// Set the field declared as `name`. Repeated and map fields take a
    /// [`Value::List`] / [`Value::Map`] holding all elements.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, BuildError> {
        let index = self.index_of(name)?;
        self.set_field(index, value.into())?;
        Ok(self)
    }

    /// Append one element to the repeated field declared as `name`.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, BuildError> {
        let index = self.index_of(name)?;
        self.push_repeated(index, value.into())?;
        Ok(self)
    }

    /// Append one entry to the map field declared as `name`.
    pub fn insert(
        &mut self,
        name: &str,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<&mut Self, BuildError> {
        let index = self.index_of(name)?;
        self.push_map_entry(index, key.into(), value.into())?;
        Ok(self)
    }

    /// Unset the field declared as `name`.
    pub fn clear(&mut self, name: &str) -> Result<&mut Self, BuildError> {
        let index = self.index_of(name)?;
        self.values[index] = None;
        Ok(self)
    }

    /// Set the field at `index`.
    pub fn set_field(&mut self, index: usize, value: Value) -> Result<(), BuildError> {
        let field = self.field_at(index)?;
        match field.cardinality() {
            Cardinality::Singular => self.check_element(field, &value)?,
            Cardinality::Repeated => {
                let Value::List(items) = &value else {
                    return Err(self.mismatch(field, "a list", &value));
                };
                for item in items {
                    self.check_element(field, item)?;
                }
            }
            Cardinality::Map(_) => {
                let Value::Map(map) = &value else {
                    return Err(self.mismatch(field, "a map", &value));
                };
                for (k, v) in map.iter() {
                    self.check_entry(field, k, v)?;
                }
            }
        }
        let keep = (field.has_explicit_presence() && !field.is_repeated() && !field.is_map())
            || !value.is_default();
        self.values[index] = keep.then_some(value);
        Ok(())
    }

    /// Append one element to the repeated field at `index`.
    pub fn push_repeated(&mut self, index: usize, value: Value) -> Result<(), BuildError> {
        let field = self.field_at(index)?;
        if !field.is_repeated() {
            return Err(self.cardinality(field, "repeated"));
        }
        self.check_element(field, &value)?;
        match &mut self.values[index] {
            Some(Value::List(items)) => items.push(value),
            slot => *slot = Some(Value::List(vec![value])),
        }
        Ok(())
    }

    /// Append one entry to the map field at `index`. Duplicate keys are kept.
    pub fn push_map_entry(&mut self, index: usize, key: Value, value: Value) -> Result<(), BuildError> {
        let field = self.field_at(index)?;
        if !field.is_map() {
            return Err(self.cardinality(field, "a map"));
        }
        self.check_entry(field, &key, &value)?;
        match &mut self.values[index] {
            Some(Value::Map(map)) => map.push(key, value),
            slot => {
                let mut map = MapValue::new();
                map.push(key, value);
                *slot = Some(Value::Map(map));
            }
        }
        Ok(())
    }

    /// Finalize into an immutable message, running the finalizer if any.
    pub fn build(self) -> Result<DynamicMessage, BuildError> {
        let message = DynamicMessage {
            descriptor: self.descriptor,
            values: self.values,
        };
        if let Some(finalizer) = &self.finalizer {
            finalizer(&message)?;
        }
        Ok(message)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn index_of(&self, name: &str) -> Result<usize, BuildError> {
        self.descriptor
            .index_of(name)
            .ok_or_else(|| BuildError::UnknownField {
                schema: self.descriptor.full_name().to_string(),
                field: name.to_string(),
            })
    }

    fn field_at(&self, index: usize) -> Result<&FieldDescriptor, BuildError> {
        self.descriptor
            .field(index)
            .ok_or_else(|| BuildError::UnknownField {
                schema: self.descriptor.full_name().to_string(),
                field: format!("#{index}"),
            })
    }

    fn check_element(&self, field: &FieldDescriptor, value: &Value) -> Result<(), BuildError> {
        if value.matches_kind(field.kind()) {
            Ok(())
        } else {
            Err(self.mismatch(field, &field.kind().to_string(), value))
        }
    }

    fn check_entry(&self, field: &FieldDescriptor, key: &Value, value: &Value) -> Result<(), BuildError> {
        let entry = field.map_entry().ok_or_else(|| self.cardinality(field, "a map"))?;
        let (key_field, value_field) =
            entry.key_value().map_err(|reason| BuildError::TypeMismatch {
                schema: self.descriptor.full_name().to_string(),
                field: field.name().to_string(),
                expected: "a well-formed map entry".to_string(),
                actual: reason,
            })?;
        if !key.matches_kind(key_field.kind()) {
            return Err(self.mismatch(field, &format!("key {}", key_field.kind()), key));
        }
        if !value.matches_kind(value_field.kind()) {
            return Err(self.mismatch(field, &format!("value {}", value_field.kind()), value));
        }
        Ok(())
    }

    fn mismatch(&self, field: &FieldDescriptor, expected: &str, actual: &Value) -> BuildError {
        BuildError::TypeMismatch {
            schema: self.descriptor.full_name().to_string(),
            field: field.name().to_string(),
            expected: expected.to_string(),
            actual: actual.kind_name().to_string(),
        }
    }

    fn cardinality(&self, field: &FieldDescriptor, expected: &'static str) -> BuildError {
        BuildError::Cardinality {
            schema: self.descriptor.full_name().to_string(),
            field: field.name().to_string(),
            expected,
        }
    }
}
