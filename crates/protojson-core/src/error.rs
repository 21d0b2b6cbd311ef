//! # Error Hierarchy
//!
//! Structured error types for the whole workspace, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! The taxonomy follows the lifecycle of the codec:
//!
//! - [`ConfigLoadError`]: the type registry could not be built. Fatal: the
//!   owning process must abort startup rather than run with a partial registry.
//! - [`CodecError`]: a single encode/decode call failed. Propagated to the
//!   immediate caller unmodified. No local recovery, no retry.
//! - [`BuildError`]: a message builder rejected a value or the native type
//!   refused construction.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for protojson.
#[derive(Error, Debug)]
pub enum ProtoJsonError {
    /// Type registry initialization failed.
    #[error("registry load error: {0}")]
    ConfigLoad(#[from] ConfigLoadError),

    /// Per-call encode/decode failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Descriptor set could not be read.
    #[error("descriptor set error: {0}")]
    DescriptorSet(#[from] DescriptorSetError),
}

/// Errors raised while loading the type registry from its config sources.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    /// The URI has a scheme other than `classpath` or `file`.
    #[error("unsupported scheme {scheme:?} in uri {uri}")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
        /// The full URI.
        uri: String,
    },

    /// The URI could not be interpreted as a resource location.
    #[error("invalid resource uri {uri}: {reason}")]
    InvalidUri {
        /// The URI text.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A `classpath` resource was not found in any resource root.
    #[error("resource {path:?} not found on the class path (uri {uri})")]
    ResourceNotFound {
        /// Resource path after leading slashes were trimmed.
        path: String,
        /// The URI that named it.
        uri: String,
    },

    /// Reading a resource failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Filesystem path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A properties line could not be parsed.
    #[error("malformed properties in {uri} at line {line}: {reason}")]
    MalformedProperties {
        /// The source URI.
        uri: String,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// A binding declared no native type name.
    #[error("native type name is not set for {full_name}")]
    MissingTypeName {
        /// The schema or enum full name.
        full_name: String,
    },

    /// A binding names a native type the catalog does not know.
    #[error("cannot resolve native type {type_name} for {full_name}")]
    UnresolvedType {
        /// The schema or enum full name.
        full_name: String,
        /// The native type name from the config source.
        type_name: String,
    },

    /// A binding names a native type of the wrong shape.
    #[error("native type {type_name} bound to {full_name} is not {expected}")]
    NonConforming {
        /// The schema or enum full name.
        full_name: String,
        /// The native type name from the config source.
        type_name: String,
        /// What the binding required (`a message type` / `an enum type`).
        expected: &'static str,
    },

    /// The native type describes a different schema than the one it is bound to.
    #[error("native type {type_name} describes {actual}, but is bound to {full_name}")]
    NameMismatch {
        /// The key the binding was declared under.
        full_name: String,
        /// The native type name.
        type_name: String,
        /// The full name found on the native type's descriptor.
        actual: String,
    },

    /// The same native type name was registered twice in the catalog.
    #[error("native type {0} registered twice")]
    DuplicateNativeType(String),

    /// The same full name was bound twice while building a registry.
    #[error("full name {0} bound twice")]
    DuplicateBinding(String),

    /// A process-global registry has already been installed.
    #[error("a global type registry is already installed")]
    AlreadyInstalled,
}

/// Errors from a single encode or decode call.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A schema or enum full name is absent from the registry.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A schema violates a codec invariant (e.g. a malformed map entry).
    #[error("corrupt descriptor {schema}.{field}: {reason}")]
    CorruptDescriptor {
        /// Full name of the schema owning the field.
        schema: String,
        /// The field whose descriptor is corrupt.
        field: String,
        /// Which invariant was violated.
        reason: String,
    },

    /// The JSON input does not match the schema.
    #[error("decode error at {path}: {reason}")]
    Decode {
        /// Location inside the JSON document, e.g. `/lines/0/sku`.
        path: String,
        /// Human-readable description.
        reason: String,
    },

    /// The finalized builder could not produce an instance.
    #[error("build error: {0}")]
    Build(#[from] BuildError),
}

impl CodecError {
    /// Shorthand for a [`CodecError::Decode`] at `path`.
    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by [`MessageBuilder`](crate::MessageBuilder) and native
/// type construction.
#[derive(Error, Debug)]
pub enum BuildError {
    /// No field with this name exists on the schema.
    #[error("{schema} has no field named {field:?}")]
    UnknownField {
        /// Schema full name.
        schema: String,
        /// The requested field name.
        field: String,
    },

    /// A value does not match the field's declared shape.
    #[error("field {schema}.{field} expects {expected}, got {actual}")]
    TypeMismatch {
        /// Schema full name.
        schema: String,
        /// Field name.
        field: String,
        /// Expected shape.
        expected: String,
        /// Actual value shape.
        actual: String,
    },

    /// A repeated/map operation was applied to a field of another cardinality.
    #[error("field {schema}.{field} is not {expected}")]
    Cardinality {
        /// Schema full name.
        schema: String,
        /// Field name.
        field: String,
        /// `repeated` or `a map`.
        expected: &'static str,
    },

    /// The native type refused the finalized values.
    #[error("cannot construct {type_name}: {reason}")]
    Native {
        /// Native type name.
        type_name: String,
        /// Why construction failed.
        reason: String,
    },
}

/// Errors loading a descriptor set file.
#[derive(Error, Debug)]
pub enum DescriptorSetError {
    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        /// File path.
        path: PathBuf,
        /// Parser error.
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        /// File path.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// The file was not found.
    #[error("descriptor file not found: {path}")]
    FileNotFound {
        /// File path.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
