//! # Native Catalog
//!
//! The compiled-in table of native types a registry may bind to. Binding
//! sources only carry type *names*; the catalog turns a name into a
//! descriptor and a way to build instances.
//!
//! Two kinds of entries exist:
//!
//! - Rust types implementing [`NativeMessage`] / [`NativeEnum`]. A message
//!   entry carries a finalizer that constructs the Rust value from every
//!   built instance, so a value the type refuses fails at build time.
//! - Descriptor-only entries with no Rust type, e.g. read from a
//!   [`DescriptorSet`](protojson_core::DescriptorSet).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use protojson_core::{
    ConfigLoadError, DescriptorSet, DynamicMessage, EnumDescriptor, Finalizer, NativeEnum,
    NativeMessage, SchemaDescriptor,
};

/// A catalog entry for a message type.
#[derive(Clone)]
pub struct NativeMessageEntry {
    descriptor: Arc<SchemaDescriptor>,
    finalizer: Option<Finalizer>,
}

impl NativeMessageEntry {
    /// The schema the native type conforms to.
    pub fn descriptor(&self) -> &Arc<SchemaDescriptor> {
        &self.descriptor
    }

    /// Construction check run on every built instance, if any.
    pub fn finalizer(&self) -> Option<&Finalizer> {
        self.finalizer.as_ref()
    }
}

impl fmt::Debug for NativeMessageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMessageEntry")
            .field("schema", &self.descriptor.full_name())
            .field("has_finalizer", &self.finalizer.is_some())
            .finish()
    }
}

/// One native type known to the catalog.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    /// A message type.
    Message(NativeMessageEntry),
    /// An enum type.
    Enum(Arc<EnumDescriptor>),
}

impl CatalogEntry {
    /// Full name of the schema the entry describes.
    pub fn full_name(&self) -> &str {
        match self {
            CatalogEntry::Message(entry) => entry.descriptor.full_name(),
            CatalogEntry::Enum(descriptor) => descriptor.full_name(),
        }
    }
}

/// Native types addressable by name.
#[derive(Debug, Clone, Default)]
pub struct NativeCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl NativeCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Rust message type under `T::TYPE_NAME`.
    pub fn register_message<T: NativeMessage>(&mut self) -> Result<&mut Self, ConfigLoadError> {
        let finalizer: Finalizer =
            Arc::new(|message: &DynamicMessage| T::from_message(message).map(|_| ()));
        self.insert(
            T::TYPE_NAME,
            CatalogEntry::Message(NativeMessageEntry {
                descriptor: Arc::new(T::descriptor()),
                finalizer: Some(finalizer),
            }),
        )
    }

    /// Register a Rust enum type under `E::TYPE_NAME`.
    pub fn register_enum<E: NativeEnum>(&mut self) -> Result<&mut Self, ConfigLoadError> {
        self.insert(E::TYPE_NAME, CatalogEntry::Enum(Arc::new(E::descriptor())))
    }

    /// Register a message schema with no Rust type behind it.
    pub fn register_dynamic_message(
        &mut self,
        type_name: impl Into<String>,
        descriptor: SchemaDescriptor,
    ) -> Result<&mut Self, ConfigLoadError> {
        self.insert(
            type_name,
            CatalogEntry::Message(NativeMessageEntry {
                descriptor: Arc::new(descriptor),
                finalizer: None,
            }),
        )
    }

    /// Register an enum schema with no Rust type behind it.
    pub fn register_dynamic_enum(
        &mut self,
        type_name: impl Into<String>,
        descriptor: EnumDescriptor,
    ) -> Result<&mut Self, ConfigLoadError> {
        self.insert(type_name, CatalogEntry::Enum(Arc::new(descriptor)))
    }

    /// Register every descriptor of `set`, each under its own full name.
    pub fn register_descriptor_set(&mut self, set: DescriptorSet) -> Result<&mut Self, ConfigLoadError> {
        for message in set.messages {
            let name = message.full_name().to_string();
            self.register_dynamic_message(name, message)?;
        }
        for en in set.enums {
            let name = en.full_name().to_string();
            self.register_dynamic_enum(name, en)?;
        }
        Ok(self)
    }

    /// The entry registered as `type_name`.
    pub fn get(&self, type_name: &str) -> Option<&CatalogEntry> {
        self.entries.get(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(
        &mut self,
        type_name: impl Into<String>,
        entry: CatalogEntry,
    ) -> Result<&mut Self, ConfigLoadError> {
        let type_name = type_name.into();
        if self.entries.contains_key(&type_name) {
            return Err(ConfigLoadError::DuplicateNativeType(type_name));
        }
        tracing::debug!(type_name = %type_name, full_name = entry.full_name(), "registered native type");
        self.entries.insert(type_name, entry);
        Ok(self)
    }
}
