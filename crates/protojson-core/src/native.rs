//! # Native Types
//!
//! Traits implemented by application types that have a protobuf schema.
//! A native message converts to and from a [`DynamicMessage`]; a native enum
//! converts to and from its numeric tag. The registry binds schema full
//! names to these implementations through a catalog, so the codec itself
//! never needs to know a concrete Rust type.

use crate::descriptor::{EnumDescriptor, SchemaDescriptor};
use crate::error::BuildError;
use crate::message::DynamicMessage;
use crate::value::{EnumValue, Value};

/// A Rust type with a message schema.
pub trait NativeMessage: Sized + Send + Sync + 'static {
    /// Native type name used in config sources, e.g. `shop::Order`.
    const TYPE_NAME: &'static str;

    /// The schema this type conforms to.
    fn descriptor() -> SchemaDescriptor;

    /// Convert into a dynamic message.
    fn to_message(&self) -> Result<DynamicMessage, BuildError>;

    /// Construct from a finalized dynamic message.
    fn from_message(message: &DynamicMessage) -> Result<Self, BuildError>;
}

/// A Rust enum with an enum schema.
pub trait NativeEnum: Sized + Copy + Send + Sync + 'static {
    /// Native type name used in config sources, e.g. `shop::Status`.
    const TYPE_NAME: &'static str;

    /// The enum schema this type conforms to.
    fn descriptor() -> EnumDescriptor;

    /// Numeric tag of this constant.
    fn number(self) -> i32;

    /// The constant with numeric tag `number`.
    fn from_number(number: i32) -> Option<Self>;

    /// The constant as a field value.
    fn to_value(self) -> Result<Value, BuildError> {
        let descriptor = Self::descriptor();
        let constant = descriptor
            .value_by_number(self.number())
            .ok_or_else(|| BuildError::Native {
                type_name: Self::TYPE_NAME.to_string(),
                reason: format!("number {} is not declared", self.number()),
            })?;
        Ok(Value::Enum(EnumValue::new(constant.name(), constant.number())))
    }

    /// The constant held by a field value.
    fn from_value(value: &Value) -> Result<Self, BuildError> {
        let constant = value.as_enum().ok_or_else(|| BuildError::Native {
            type_name: Self::TYPE_NAME.to_string(),
            reason: format!("expected enum, got {}", value.kind_name()),
        })?;
        Self::from_number(constant.number()).ok_or_else(|| BuildError::Native {
            type_name: Self::TYPE_NAME.to_string(),
            reason: format!("no constant with number {}", constant.number()),
        })
    }
}
