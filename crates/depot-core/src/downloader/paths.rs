//! Artifact path resolution.

use crate::config::DepotConfig;
use std::path::{Path, PathBuf};

/// Location of an artifact: `<root>/<type>/<version>.json`.
///
/// Pure path arithmetic. Callers must validate `artifact_type` and `version`
/// first; nothing here resolves `..` or follows links.
pub fn resolve_artifact_path(root: &Path, artifact_type: &str, version: &str) -> PathBuf {
    root.join(artifact_type)
        .join(format!("{}.{}", version, DepotConfig::ARTIFACT_EXTENSION))
}
