//! # Type Registry
//!
//! Immutable mapping from schema/enum full names to native types, built once
//! at startup and shared read-only afterwards.
//!
//! ## Loading
//!
//! [`TypeRegistry::load`] reads both binding sources, resolves each native
//! type name through the [`NativeCatalog`], and checks that it conforms:
//!
//! - the name is not empty;
//! - the catalog knows it;
//! - a message binding names a message type, an enum binding an enum type;
//! - the native type describes the full name it is bound to.
//!
//! Any violation fails the whole load. A registry is never partially loaded.
//!
//! Nested references to schemas without a binding are only warned about:
//! they fail with `UnknownType` if and when decoding reaches them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use protojson_core::{
    ConfigLoadError, EnumDescriptor, FieldKind, Finalizer, MessageBuilder, SchemaDescriptor,
};

use crate::catalog::{CatalogEntry, NativeCatalog};
use crate::source::RegistryConfig;

/// A bound message type.
#[derive(Clone)]
pub struct MessageType {
    full_name: String,
    type_name: String,
    descriptor: Arc<SchemaDescriptor>,
    finalizer: Option<Finalizer>,
}

impl MessageType {
    /// Schema full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Native type name it is bound to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The schema.
    pub fn descriptor(&self) -> &Arc<SchemaDescriptor> {
        &self.descriptor
    }

    /// A fresh, empty builder for this type.
    pub fn new_builder(&self) -> MessageBuilder {
        let builder = MessageBuilder::new(Arc::clone(&self.descriptor));
        match &self.finalizer {
            Some(finalizer) => builder.with_finalizer(Arc::clone(finalizer)),
            None => builder,
        }
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageType")
            .field("full_name", &self.full_name)
            .field("type_name", &self.type_name)
            .field("fields", &self.descriptor.fields().len())
            .finish()
    }
}

/// A bound enum type.
#[derive(Debug, Clone)]
pub struct EnumType {
    full_name: String,
    type_name: String,
    descriptor: Arc<EnumDescriptor>,
}

impl EnumType {
    /// Enum full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Native type name it is bound to.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The enum schema.
    pub fn descriptor(&self) -> &Arc<EnumDescriptor> {
        &self.descriptor
    }
}

/// Full-name → native type bindings for messages and enums.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    messages: BTreeMap<String, MessageType>,
    enums: BTreeMap<String, EnumType>,
}

impl TypeRegistry {
    /// Read the binding sources named by `config` and resolve them against
    /// `catalog`.
    pub fn load(config: &RegistryConfig, catalog: &NativeCatalog) -> Result<Self, ConfigLoadError> {
        tracing::debug!(
            message_types = %config.message_types_uri,
            enum_types = %config.enum_types_uri,
            "loading type registry"
        );
        let message_bindings = config.read_message_bindings()?;
        let enum_bindings = config.read_enum_bindings()?;

        let mut builder = Self::builder(catalog);
        for (full_name, type_name) in &message_bindings {
            builder.bind_message(full_name, type_name)?;
        }
        for (full_name, type_name) in &enum_bindings {
            builder.bind_enum(full_name, type_name)?;
        }
        let registry = builder.build();
        tracing::info!(
            messages = registry.messages.len(),
            enums = registry.enums.len(),
            "type registry loaded"
        );
        Ok(registry)
    }

    /// Start building a registry programmatically.
    pub fn builder(catalog: &NativeCatalog) -> TypeRegistryBuilder<'_> {
        TypeRegistryBuilder {
            catalog,
            registry: TypeRegistry::default(),
        }
    }

    /// The message type bound to `full_name`.
    pub fn lookup_message_type(&self, full_name: &str) -> Option<&MessageType> {
        self.messages.get(full_name)
    }

    /// The enum type bound to `full_name`.
    pub fn lookup_enum_type(&self, full_name: &str) -> Option<&EnumType> {
        self.enums.get(full_name)
    }

    /// A fresh builder for `message_type`.
    pub fn new_builder(&self, message_type: &MessageType) -> MessageBuilder {
        message_type.new_builder()
    }

    /// Bound message types, sorted by full name.
    pub fn message_types(&self) -> impl Iterator<Item = &MessageType> + '_ {
        self.messages.values()
    }

    /// Bound enum types, sorted by full name.
    pub fn enum_types(&self) -> impl Iterator<Item = &EnumType> + '_ {
        self.enums.values()
    }

    /// References from bound schemas to full names with no binding, as
    /// `(referring schema, referenced name)` pairs.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for message in self.messages.values() {
            for kind in message.descriptor.references() {
                let missing = match kind {
                    FieldKind::Message(name) => (!self.messages.contains_key(name)).then_some(name),
                    FieldKind::Enum(name) => (!self.enums.contains_key(name)).then_some(name),
                    _ => None,
                };
                if let Some(name) = missing {
                    out.push((message.full_name.as_str(), name.as_str()));
                }
            }
        }
        out
    }
}

/// Accumulates checked bindings. See [`TypeRegistry::builder`].
#[derive(Debug)]
pub struct TypeRegistryBuilder<'a> {
    catalog: &'a NativeCatalog,
    registry: TypeRegistry,
}

impl<'a> TypeRegistryBuilder<'a> {
    /// Bind the schema `full_name` to the catalog's message type `type_name`.
    pub fn bind_message(&mut self, full_name: &str, type_name: &str) -> Result<&mut Self, ConfigLoadError> {
        let type_name = type_name.trim();
        let entry = self.resolve(full_name, type_name)?;
        let CatalogEntry::Message(entry) = entry else {
            return Err(ConfigLoadError::NonConforming {
                full_name: full_name.to_string(),
                type_name: type_name.to_string(),
                expected: "a message type",
            });
        };
        check_name(full_name, type_name, entry.descriptor().full_name())?;
        if self.registry.messages.contains_key(full_name) {
            return Err(ConfigLoadError::DuplicateBinding(full_name.to_string()));
        }
        tracing::debug!(full_name, type_name, "bound message type");
        self.registry.messages.insert(
            full_name.to_string(),
            MessageType {
                full_name: full_name.to_string(),
                type_name: type_name.to_string(),
                descriptor: Arc::clone(entry.descriptor()),
                finalizer: entry.finalizer().cloned(),
            },
        );
        Ok(self)
    }

    /// Bind the enum `full_name` to the catalog's enum type `type_name`.
    pub fn bind_enum(&mut self, full_name: &str, type_name: &str) -> Result<&mut Self, ConfigLoadError> {
        let type_name = type_name.trim();
        let entry = self.resolve(full_name, type_name)?;
        let CatalogEntry::Enum(descriptor) = entry else {
            return Err(ConfigLoadError::NonConforming {
                full_name: full_name.to_string(),
                type_name: type_name.to_string(),
                expected: "an enum type",
            });
        };
        check_name(full_name, type_name, descriptor.full_name())?;
        if self.registry.enums.contains_key(full_name) {
            return Err(ConfigLoadError::DuplicateBinding(full_name.to_string()));
        }
        tracing::debug!(full_name, type_name, "bound enum type");
        self.registry.enums.insert(
            full_name.to_string(),
            EnumType {
                full_name: full_name.to_string(),
                type_name: type_name.to_string(),
                descriptor: Arc::clone(descriptor),
            },
        );
        Ok(self)
    }

    /// Finish, warning about references that have no binding.
    pub fn build(self) -> TypeRegistry {
        for (schema, missing) in self.registry.dangling_references() {
            tracing::warn!(schema, missing, "schema references a type with no binding");
        }
        self.registry
    }

    fn resolve(&self, full_name: &str, type_name: &str) -> Result<&'a CatalogEntry, ConfigLoadError> {
        if type_name.is_empty() {
            return Err(ConfigLoadError::MissingTypeName {
                full_name: full_name.to_string(),
            });
        }
        self.catalog
            .get(type_name)
            .ok_or_else(|| ConfigLoadError::UnresolvedType {
                full_name: full_name.to_string(),
                type_name: type_name.to_string(),
            })
    }
}

fn check_name(full_name: &str, type_name: &str, actual: &str) -> Result<(), ConfigLoadError> {
    if full_name == actual {
        Ok(())
    } else {
        Err(ConfigLoadError::NameMismatch {
            full_name: full_name.to_string(),
            type_name: type_name.to_string(),
            actual: actual.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Process-global registry
// ---------------------------------------------------------------------------

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Publish `registry` as the process-wide registry. Only the first call wins.
pub fn install_global(registry: TypeRegistry) -> Result<&'static TypeRegistry, ConfigLoadError> {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if installed {
        Ok(global)
    } else {
        Err(ConfigLoadError::AlreadyInstalled)
    }
}

/// The process-wide registry, if one was installed.
pub fn global() -> Option<&'static TypeRegistry> {
    GLOBAL.get()
}

/// Load a registry or terminate the process with status 1.
///
/// For binaries that cannot run at all without their bindings.
pub fn load_or_exit(config: &RegistryConfig, catalog: &NativeCatalog) -> TypeRegistry {
    match TypeRegistry::load(config, catalog) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "failed to load type registry, exiting");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protojson_core::{FieldDescriptor, ScalarType};

    fn catalog() -> NativeCatalog {
        let mut catalog = NativeCatalog::new();
        catalog
            .register_dynamic_message(
                "memo::Note",
                SchemaDescriptor::new(
                    "memo.Note",
                    vec![
                        FieldDescriptor::singular("text", FieldKind::scalar(ScalarType::String)),
                        FieldDescriptor::singular("mood", FieldKind::enumeration("memo.Mood")),
                        FieldDescriptor::singular("reply", FieldKind::message("memo.Reply")),
                    ],
                ),
            )
            .unwrap()
            .register_dynamic_enum("memo::Mood", EnumDescriptor::new("memo.Mood", [("CALM", 0)]))
            .unwrap();
        catalog
    }

    #[test]
    fn bindings_resolve_through_catalog() {
        let catalog = catalog();
        let mut builder = TypeRegistry::builder(&catalog);
        builder
            .bind_message("memo.Note", "memo::Note")
            .unwrap()
            .bind_enum("memo.Mood", " memo::Mood ")
            .unwrap();
        let registry = builder.build();

        let note = registry.lookup_message_type("memo.Note").unwrap();
        assert_eq!(note.type_name(), "memo::Note");
        assert_eq!(registry.lookup_enum_type("memo.Mood").unwrap().type_name(), "memo::Mood");
        assert!(registry.lookup_message_type("memo.Mood").is_none());

        let built = registry.new_builder(note).build().unwrap();
        assert_eq!(built.full_name(), "memo.Note");
    }

    #[test]
    fn empty_type_name_is_fatal() {
        let catalog = catalog();
        let err = TypeRegistry::builder(&catalog)
            .bind_message("memo.Note", "  ")
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingTypeName { .. }));
    }

    #[test]
    fn unknown_type_name_is_fatal() {
        let catalog = catalog();
        let err = TypeRegistry::builder(&catalog)
            .bind_message("memo.Note", "memo::Missing")
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnresolvedType { .. }));
    }

    #[test]
    fn message_bound_to_enum_type_is_fatal() {
        let catalog = catalog();
        let err = TypeRegistry::builder(&catalog)
            .bind_message("memo.Mood", "memo::Mood")
            .unwrap_err();
        assert!(format!("{err}").contains("is not a message type"), "{err}");

        let err = TypeRegistry::builder(&catalog)
            .bind_enum("memo.Note", "memo::Note")
            .unwrap_err();
        assert!(format!("{err}").contains("is not an enum type"), "{err}");
    }

    #[test]
    fn bound_name_must_match_descriptor() {
        let catalog = catalog();
        let err = TypeRegistry::builder(&catalog)
            .bind_message("memo.Other", "memo::Note")
            .unwrap_err();
        match err {
            ConfigLoadError::NameMismatch { actual, .. } => assert_eq!(actual, "memo.Note"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_binding_is_rejected() {
        let catalog = catalog();
        let mut builder = TypeRegistry::builder(&catalog);
        builder.bind_message("memo.Note", "memo::Note").unwrap();
        let err = builder.bind_message("memo.Note", "memo::Note").unwrap_err();
        assert!(matches!(err, ConfigLoadError::DuplicateBinding(_)));
    }

    #[test]
    fn dangling_references_are_listed() {
        let catalog = catalog();
        let mut builder = TypeRegistry::builder(&catalog);
        builder.bind_message("memo.Note", "memo::Note").unwrap();
        let registry = builder.build();
        assert_eq!(
            registry.dangling_references(),
            vec![("memo.Note", "memo.Mood"), ("memo.Note", "memo.Reply")]
        );
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeRegistry>();
    }
}
