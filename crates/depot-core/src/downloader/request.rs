//! Download request parsing and validation.

use crate::config::{ConfigCache, DepotConfig};
use crate::error::{DepotError, Result};
use crate::runtime::RpcLogger;
use serde::Deserialize;
use serde_json::Value;

/// A request for one artifact revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub artifact_type: String,
    pub version: String,
    /// Checksum the caller expects, if any.
    pub hash: Option<String>,
}

/// Fields a caller may override. Absent and `null` both mean "keep the default".
#[derive(Debug, Default, Deserialize)]
struct RequestOverlay {
    #[serde(rename = "type", default)]
    artifact_type: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    hash: Option<String>,
}

impl DownloadRequest {
    /// Request for the configured default type and version.
    pub fn from_defaults(config: &ConfigCache) -> Result<Self> {
        Ok(Self {
            artifact_type: config.require(DepotConfig::DEFAULT_TYPE_KEY)?,
            version: config.require(DepotConfig::DEFAULT_VERSION_KEY)?,
            hash: None,
        })
    }

    /// Build a request from a raw payload, filling absent fields from defaults.
    ///
    /// A blank or `null` payload yields the default request. Malformed payloads are
    /// caller errors and are logged at info level only.
    pub fn normalize(
        payload: &str,
        config: &ConfigCache,
        logger: &dyn RpcLogger,
    ) -> Result<Self> {
        let mut request = Self::from_defaults(config)?;
        if payload.trim().is_empty() {
            return Ok(request);
        }

        let overlay = parse_overlay(payload).map_err(|err| {
            logger.info(&format!("Unable to deserialize request: {}", err));
            err
        })?;

        if let Some(artifact_type) = overlay.artifact_type {
            request.artifact_type = artifact_type;
        }
        if let Some(version) = overlay.version {
            request.version = version;
        }
        request.hash = overlay.hash;

        Ok(request)
    }

    /// Reject field values that could escape the artifact root.
    pub fn validate(&self) -> Result<()> {
        validate_path_component("type", &self.artifact_type)?;
        validate_path_component("version", &self.version)?;
        Ok(())
    }
}

fn parse_overlay(payload: &str) -> Result<RequestOverlay> {
    match serde_json::from_str(payload).map_err(malformed)? {
        Value::Null => Ok(RequestOverlay::default()),
        value @ Value::Object(_) => serde_json::from_value(value).map_err(malformed),
        _ => Err(DepotError::MalformedRequest {
            message: "request payload must be a JSON object".to_string(),
            source: None,
        }),
    }
}

fn malformed(err: serde_json::Error) -> DepotError {
    DepotError::MalformedRequest {
        message: err.to_string(),
        source: Some(err),
    }
}

/// Ensure a caller-supplied value is a single plain path component.
fn validate_path_component(field: &'static str, value: &str) -> Result<()> {
    let invalid = |reason: &str| DepotError::InvalidArgument {
        field,
        reason: reason.to_string(),
    };

    if value.contains('/') {
        return Err(invalid("must not contain /"));
    }
    // Covers `\` on Windows
    if value.chars().any(std::path::is_separator) {
        return Err(invalid("must not contain a path separator"));
    }
    if value.contains('\0') {
        return Err(invalid("must not contain NUL"));
    }
    match value {
        "" => Err(invalid("must not be empty")),
        "." | ".." => Err(invalid("must not be a relative path component")),
        _ => Ok(()),
    }
}
