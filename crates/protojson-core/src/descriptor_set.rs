//! # Descriptor Sets
//!
//! A file holding message and enum descriptors, used to register schemas
//! that have no Rust type behind them. The format is chosen by extension:
//! `.yaml`/`.yml` are read as YAML, anything else as JSON.
//!
//! ```yaml
//! messages:
//!   - full_name: shop.Line
//!     fields:
//!       - { name: sku, kind: string }
//!       - { name: qty, kind: int32 }
//! enums:
//!   - full_name: shop.Status
//!     values:
//!       - { name: STATUS_UNKNOWN, number: 0 }
//!       - { name: PAID, number: 1 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::{EnumDescriptor, SchemaDescriptor};
use crate::error::DescriptorSetError;

/// Message and enum descriptors loaded together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorSet {
    /// Message schemas.
    #[serde(default)]
    pub messages: Vec<SchemaDescriptor>,
    /// Enum schemas.
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl DescriptorSet {
    /// Load a descriptor set from `path`.
    pub fn load(path: &Path) -> Result<Self, DescriptorSetError> {
        if !path.exists() {
            return Err(DescriptorSetError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|source| DescriptorSetError::YamlParse {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => serde_json::from_str(&content).map_err(|source| DescriptorSetError::JsonParse {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Append every descriptor of `other`.
    pub fn merge(&mut self, other: DescriptorSet) {
        self.messages.extend(other.messages);
        self.enums.extend(other.enums);
    }

    /// Whether the set holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.enums.is_empty()
    }
}
