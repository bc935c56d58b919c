//! Configuration for the artifact depot.
//!
//! Static constants live on [`DepotConfig`]. Operator-supplied values come from
//! the environment and are memoised in a [`ConfigCache`] owned by the handler.

use crate::error::{DepotError, Result};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Static service configuration.
pub struct DepotConfig;

impl DepotConfig {
    /// Name the downloader is registered under in the RPC registry.
    pub const RPC_NAME: &'static str = "FileDownloader";
    /// Extension appended to `<version>` when resolving an artifact path.
    pub const ARTIFACT_EXTENSION: &'static str = "json";

    // Environment keys
    pub const DEFAULT_TYPE_KEY: &'static str = "default_type";
    pub const DEFAULT_VERSION_KEY: &'static str = "default_version";
    pub const ARTIFACT_ROOT_KEY: &'static str = "artifact_root";
    pub const CONTENT_ENCODING_KEY: &'static str = "content_encoding";
}

/// How artifact bytes are written into the `content` field of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncoding {
    /// Bytes are emitted as UTF-8 text.
    #[default]
    Text,
    /// Bytes are emitted as standard base64.
    Base64,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Text => "text",
            ContentEncoding::Base64 => "base64",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "utf8" | "utf-8" => Some(ContentEncoding::Text),
            "base64" => Some(ContentEncoding::Base64),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of raw configuration values.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads values from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Process-wide cache of resolved configuration values.
///
/// A key is looked up in the environment on first use and never evicted.
/// Concurrent first lookups of the same key race only on the write lock; the
/// first inserted value wins.
pub struct ConfigCache {
    source: Box<dyn EnvSource>,
    values: RwLock<HashMap<String, String>>,
}

impl ConfigCache {
    pub fn new(source: impl EnvSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Cache backed by the process environment.
    pub fn from_env() -> Self {
        Self::new(ProcessEnv)
    }

    /// Look up a key, consulting the environment only on a cache miss.
    pub fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.read_cached(key) {
            return Some(value);
        }

        let value = self.source.var(key)?;
        debug!("Caching configuration value for {}", key);

        let mut values = match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Some(values.entry(key.to_string()).or_insert(value).clone())
    }

    /// Look up a key that must be configured.
    pub fn require(&self, key: &str) -> Result<String> {
        self.lookup(key)
            .ok_or_else(|| DepotError::misconfigured(format!("missing value for {}", key)))
    }

    /// Resolve the content encoding, defaulting to text when unset.
    pub fn content_encoding(&self) -> Result<ContentEncoding> {
        match self.lookup(DepotConfig::CONTENT_ENCODING_KEY) {
            None => Ok(ContentEncoding::default()),
            Some(raw) => ContentEncoding::from_str(&raw).ok_or_else(|| {
                DepotError::misconfigured(format!(
                    "unsupported {}: {}",
                    DepotConfig::CONTENT_ENCODING_KEY,
                    raw
                ))
            }),
        }
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        match self.values.read() {
            Ok(values) => values.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_cached(&self, key: &str) -> Option<String> {
        let values = match self.values.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(key).cloned()
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("cached_keys", &self.len())
            .finish()
    }
}
