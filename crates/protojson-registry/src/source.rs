//! # Config Sources
//!
//! Where binding tables come from. A source is named by a URI:
//!
//! - `classpath:///name.properties` looks `name.properties` up on the
//!   [`ClassPath`]: embedded resources first, then resource directories.
//! - `file:///abs/path.properties` reads the file directly.
//!
//! Scheme matching is case-insensitive. A configured URI that cannot be parsed
//! is logged and replaced by the default URI, so the failure, if any, surfaces
//! when the default is read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use protojson_core::ConfigLoadError;
use url::Url;

use crate::properties::{parse_properties, Properties};

/// Default source of message bindings.
pub const DEFAULT_MESSAGE_TYPES_URI: &str = "classpath:///proto-message-types.properties";

/// Default source of enum bindings.
pub const DEFAULT_ENUM_TYPES_URI: &str = "classpath:///proto-enum-types.properties";

/// Environment variable overriding the message bindings URI.
pub const MESSAGE_TYPES_ENV: &str = "PROTO_MESSAGE_TYPES_MAP";

/// Environment variable overriding the enum bindings URI.
pub const ENUM_TYPES_ENV: &str = "PROTO_ENUM_TYPES_MAP";

/// Environment variable overriding the resource directory.
pub const RESOURCE_ROOT_ENV: &str = "PROTOJSON_RESOURCE_ROOT";

/// Resource directory used when none is configured.
pub const DEFAULT_RESOURCE_ROOT: &str = "resources";

// ---------------------------------------------------------------------------
// URIs
// ---------------------------------------------------------------------------

/// A parsed source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// Resource path relative to the class path roots.
    Classpath(String),
    /// Absolute filesystem path.
    File(PathBuf),
}

impl ResourceUri {
    /// Parse a source URI.
    pub fn parse(raw: &str) -> Result<Self, ConfigLoadError> {
        let url = Url::parse(raw).map_err(|e| ConfigLoadError::InvalidUri {
            uri: raw.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(&url, raw)
    }

    /// Parse `configured`, falling back to `default` if it is not a URI.
    ///
    /// A scheme-less value is rejected rather than replaced: it parsed, it
    /// just names nothing.
    pub fn resolve(configured: &str, default: &str) -> Result<Self, ConfigLoadError> {
        tracing::debug!(uri = configured, default, "resolving binding source");
        let url = match Url::parse(configured) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Err(ConfigLoadError::InvalidUri {
                    uri: configured.to_string(),
                    reason: "scheme is missing".to_string(),
                })
            }
            Err(e) => {
                tracing::error!(
                    uri = configured,
                    default,
                    error = %e,
                    "failed to parse binding source uri, falling back to default"
                );
                return Self::parse(default);
            }
        };
        Self::from_url(&url, configured)
    }

    fn from_url(url: &Url, raw: &str) -> Result<Self, ConfigLoadError> {
        // `Url` lower-cases the scheme.
        match url.scheme() {
            "classpath" => {
                let decoded = percent_decode_str(url.path()).decode_utf8().map_err(|e| {
                    ConfigLoadError::InvalidUri {
                        uri: raw.to_string(),
                        reason: format!("classpath resource path is not valid UTF-8: {e}"),
                    }
                })?;
                let path = decoded.trim_start_matches('/').trim();
                if path.is_empty() {
                    return Err(ConfigLoadError::InvalidUri {
                        uri: raw.to_string(),
                        reason: "classpath resource path is empty".to_string(),
                    });
                }
                Ok(ResourceUri::Classpath(path.to_string()))
            }
            "file" => url
                .to_file_path()
                .map(ResourceUri::File)
                .map_err(|()| ConfigLoadError::InvalidUri {
                    uri: raw.to_string(),
                    reason: "not an absolute local file path".to_string(),
                }),
            other => Err(ConfigLoadError::UnsupportedScheme {
                scheme: other.to_string(),
                uri: raw.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Class path
// ---------------------------------------------------------------------------

/// Ordered resource roots searched by `classpath` URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPath {
    embedded: BTreeMap<String, String>,
    dirs: Vec<PathBuf>,
}

impl Default for ClassPath {
    fn default() -> Self {
        Self::new().with_dir(DEFAULT_RESOURCE_ROOT)
    }
}

impl ClassPath {
    /// An empty class path: every lookup misses.
    pub fn new() -> Self {
        Self {
            embedded: BTreeMap::new(),
            dirs: Vec::new(),
        }
    }

    /// The default class path, with its directory taken from
    /// `PROTOJSON_RESOURCE_ROOT` when set.
    pub fn from_env() -> Self {
        match std::env::var(RESOURCE_ROOT_ENV) {
            Ok(root) if !root.trim().is_empty() => Self::new().with_dir(root.trim()),
            _ => Self::default(),
        }
    }

    /// Add a compiled-in resource. Embedded resources shadow directories.
    pub fn with_embedded(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.embedded.insert(path.into(), content.into());
        self
    }

    /// Append a resource directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// The resource directories, in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Read the resource at `path`. `uri` only labels errors.
    pub fn read(&self, path: &str, uri: &str) -> Result<String, ConfigLoadError> {
        if let Some(content) = self.embedded.get(path) {
            tracing::debug!(resource = path, "reading embedded resource");
            return Ok(content.clone());
        }
        for dir in &self.dirs {
            let candidate = dir.join(path);
            if candidate.is_file() {
                tracing::debug!(resource = path, file = %candidate.display(), "reading resource");
                return read_file(&candidate);
            }
        }
        Err(ConfigLoadError::ResourceNotFound {
            path: path.to_string(),
            uri: uri.to_string(),
        })
    }
}

fn read_file(path: &Path) -> Result<String, ConfigLoadError> {
    std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Registry configuration
// ---------------------------------------------------------------------------

/// Where the type registry reads its binding tables from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// URI of the `schema full name = native type name` table for messages.
    pub message_types_uri: String,
    /// URI of the `enum full name = native type name` table for enums.
    pub enum_types_uri: String,
    /// Roots searched by `classpath` URIs.
    pub class_path: ClassPath,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            message_types_uri: DEFAULT_MESSAGE_TYPES_URI.to_string(),
            enum_types_uri: DEFAULT_ENUM_TYPES_URI.to_string(),
            class_path: ClassPath::default(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PROTO_MESSAGE_TYPES_MAP` (default: `classpath:///proto-message-types.properties`)
    /// - `PROTO_ENUM_TYPES_MAP` (default: `classpath:///proto-enum-types.properties`)
    /// - `PROTOJSON_RESOURCE_ROOT` (default: `resources`)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok()).with_class_path(ClassPath::from_env())
    }

    /// Build a configuration from an arbitrary variable lookup. The class
    /// path is left at its default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            message_types_uri: lookup(MESSAGE_TYPES_ENV)
                .unwrap_or_else(|| DEFAULT_MESSAGE_TYPES_URI.to_string()),
            enum_types_uri: lookup(ENUM_TYPES_ENV)
                .unwrap_or_else(|| DEFAULT_ENUM_TYPES_URI.to_string()),
            class_path: ClassPath::default(),
        }
    }

    /// Replace the class path.
    pub fn with_class_path(mut self, class_path: ClassPath) -> Self {
        self.class_path = class_path;
        self
    }

    /// Read and parse the message bindings table.
    pub fn read_message_bindings(&self) -> Result<Properties, ConfigLoadError> {
        self.read_bindings(&self.message_types_uri, DEFAULT_MESSAGE_TYPES_URI)
    }

    /// Read and parse the enum bindings table.
    pub fn read_enum_bindings(&self) -> Result<Properties, ConfigLoadError> {
        self.read_bindings(&self.enum_types_uri, DEFAULT_ENUM_TYPES_URI)
    }

    fn read_bindings(&self, configured: &str, default: &str) -> Result<Properties, ConfigLoadError> {
        let uri = ResourceUri::resolve(configured, default)?;
        let text = match &uri {
            ResourceUri::Classpath(path) => self.class_path.read(path, configured)?,
            ResourceUri::File(path) => {
                tracing::debug!(file = %path.display(), "reading binding source from filesystem");
                read_file(path)?
            }
        };
        tracing::trace!(uri = configured, bytes = text.len(), "binding source read");
        parse_properties(&text, configured)
    }
}
