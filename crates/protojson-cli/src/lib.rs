//! # protojson-cli — Command-Line Front End
//!
//! Provides the `protojson` binary for checking JSON documents against
//! schemas without writing Rust.
//!
//! ## Subcommands
//!
//! - `protojson types`: load the registry and list its bindings.
//! - `protojson decode --type NAME [FILE|-]`: decode and print the canonical
//!   re-encoding.
//! - `protojson roundtrip --type NAME [FILE|-]`: decode, encode, decode again
//!   and compare.
//!
//! ## Type sources
//!
//! The binary has no compiled-in message types. Schemas come from descriptor
//! files passed with `--descriptors`; each type is registered in the catalog
//! under its full name. Binding tables are read as the library reads them
//! (`PROTO_MESSAGE_TYPES_MAP`, `PROTO_ENUM_TYPES_MAP`, resource root). When a
//! table is absent, every descriptor type is bound under its own full name.
//!
//! ```bash
//! protojson --descriptors shop.yaml decode --type shop.Order order.json
//! ```

pub mod convert;
pub mod types;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use protojson_core::{ConfigLoadError, DescriptorSet};
use protojson_registry::{ClassPath, NativeCatalog, Properties, RegistryConfig, TypeRegistry};

/// Build the registry from descriptor files and the binding tables.
///
/// `resource_root`, when given, replaces the class path directories.
pub fn load_registry(resource_root: Option<&Path>, descriptors: &[PathBuf]) -> Result<TypeRegistry> {
    let mut set = DescriptorSet::default();
    for path in descriptors {
        let loaded = DescriptorSet::load(path)
            .with_context(|| format!("failed to load descriptors from {}", path.display()))?;
        tracing::info!(
            file = %path.display(),
            messages = loaded.messages.len(),
            enums = loaded.enums.len(),
            "loaded descriptor set"
        );
        set.merge(loaded);
    }
    let message_names: BTreeSet<String> =
        set.messages.iter().map(|m| m.full_name().to_string()).collect();
    let enum_names: BTreeSet<String> =
        set.enums.iter().map(|e| e.full_name().to_string()).collect();

    let mut catalog = NativeCatalog::new();
    catalog
        .register_descriptor_set(set)
        .context("failed to register descriptor types")?;

    let mut config = RegistryConfig::from_env();
    if let Some(root) = resource_root {
        config = config.with_class_path(ClassPath::new().with_dir(root));
    }
    let message_bindings = optional_bindings(config.read_message_bindings())?;
    let enum_bindings = optional_bindings(config.read_enum_bindings())?;

    let mut builder = TypeRegistry::builder(&catalog);
    for (full_name, type_name) in &message_bindings {
        builder.bind_message(full_name, type_name)?;
    }
    for full_name in message_names.iter().filter(|n| !message_bindings.contains_key(*n)) {
        builder.bind_message(full_name, full_name)?;
    }
    for (full_name, type_name) in &enum_bindings {
        builder.bind_enum(full_name, type_name)?;
    }
    for full_name in enum_names.iter().filter(|n| !enum_bindings.contains_key(*n)) {
        builder.bind_enum(full_name, full_name)?;
    }
    Ok(builder.build())
}

/// A binding table that is simply not there counts as empty. Every other
/// failure is fatal.
fn optional_bindings(result: Result<Properties, ConfigLoadError>) -> Result<Properties> {
    match result {
        Err(ConfigLoadError::ResourceNotFound { path, .. }) => {
            tracing::debug!(resource = %path, "no binding table, binding descriptor types by full name");
            Ok(Properties::new())
        }
        other => other.context("failed to read binding table"),
    }
}

/// Read the whole input. `None` and `-` mean standard input.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read standard input")?;
            Ok(buf)
        }
    }
}
