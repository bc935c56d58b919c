//! The `FileDownloader` RPC.
//!
//! One linear pipeline per call:
//!
//! 1. Normalize the payload over the configured defaults
//! 2. Validate `type` and `version` as plain path components
//! 3. Resolve `<artifact_root>/<type>/<version>.json`
//! 4. Read the artifact
//! 5. Check its CRC-32 against the caller's expectation
//! 6. Serialize the response
//! 7. Count the download if content is delivered (best-effort)
//!
//! Any failure other than the statistics write aborts the call before anything
//! is counted; the host then answers with `{}` and the error.

mod integrity;
mod paths;
mod request;
mod response;

pub use integrity::{checksum, Integrity};
pub use paths::resolve_artifact_path;
pub use request::DownloadRequest;
pub use response::DownloadResponse;

use crate::config::{ConfigCache, ContentEncoding, DepotConfig};
use crate::error::{DepotError, Result};
use crate::runtime::{ArtifactSource, RpcContext, RpcFunction, RpcLogger};
use crate::stats::StatsStore;
use std::path::{Path, PathBuf};

/// Serves typed, versioned artifacts and counts verified deliveries.
#[derive(Debug)]
pub struct FileDownloader {
    config: ConfigCache,
}

impl FileDownloader {
    pub fn new(config: ConfigCache) -> Self {
        Self { config }
    }

    /// Downloader configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(ConfigCache::from_env())
    }

    /// Run the full pipeline and return the serialized response.
    ///
    /// The download is counted only once the payload has been built.
    pub fn download(
        &self,
        logger: &dyn RpcLogger,
        db: &dyn StatsStore,
        nk: &dyn ArtifactSource,
        payload: &str,
        encoding: ContentEncoding,
    ) -> Result<String> {
        let (response, path) = self.fetch(logger, nk, payload)?;
        let serialized = response.to_payload(encoding)?;
        record_statistics(logger, db, &response, &path);
        Ok(serialized)
    }

    /// Resolve, read and integrity-check the requested artifact.
    fn fetch(
        &self,
        logger: &dyn RpcLogger,
        nk: &dyn ArtifactSource,
        payload: &str,
    ) -> Result<(DownloadResponse, PathBuf)> {
        let request = DownloadRequest::normalize(payload, &self.config, logger)?;
        request.validate()?;

        let root = self.config.require(DepotConfig::ARTIFACT_ROOT_KEY)?;
        let path =
            resolve_artifact_path(Path::new(&root), &request.artifact_type, &request.version);
        let bytes = load_artifact(nk, &path)?;

        let response = DownloadResponse::from_artifact(request, bytes);
        if response.content.is_none() {
            logger.debug(&format!(
                "Hash mismatch for {}, content withheld",
                path.display()
            ));
        }
        Ok((response, path))
    }
}

impl RpcFunction for FileDownloader {
    fn call(
        &self,
        _ctx: &RpcContext,
        logger: &dyn RpcLogger,
        db: &dyn StatsStore,
        nk: &dyn ArtifactSource,
        payload: &str,
    ) -> Result<String> {
        logger.debug(&format!("Payload: {}", payload));
        let encoding = self.config.content_encoding()?;
        self.download(logger, db, nk, payload, encoding)
    }
}

fn load_artifact(nk: &dyn ArtifactSource, path: &Path) -> Result<Vec<u8>> {
    nk.read(path).map_err(|e| DepotError::ArtifactNotFound {
        path: PathBuf::from(path),
        source: Some(e),
    })
}

/// Count a delivered download. Failures are logged and never surface.
fn record_statistics(
    logger: &dyn RpcLogger,
    db: &dyn StatsStore,
    response: &DownloadResponse,
    path: &Path,
) {
    if response.content.is_none() {
        return;
    }
    let Some(hash) = response.hash.as_deref() else {
        return;
    };

    let file_name = path.to_string_lossy();
    if let Err(e) = db.record_download(&file_name, hash) {
        logger.error(&format!(
            "Failed to record download statistics for {}: {}",
            file_name, e
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_support::{CountingSource, RecordingLogger};
    use crate::runtime::FsArtifactSource;
    use crate::stats::SqliteStatsStore;
    use serde_json::Value;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Artifact root with `core/1.0.0.json` and `custom/5.0.0.json`.
    fn create_artifact_root() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("core")).unwrap();
        std::fs::create_dir_all(root.join("custom")).unwrap();
        std::fs::write(root.join("core/1.0.0.json"), br#"{"core": "1.0.0"}"#).unwrap();
        std::fs::write(root.join("custom/5.0.0.json"), br#"{"custom": "5.0.0"}"#).unwrap();
        temp_dir
    }

    fn downloader(root: &Path) -> FileDownloader {
        let mut env = HashMap::new();
        env.insert("default_type".to_string(), "core".to_string());
        env.insert("default_version".to_string(), "1.0.0".to_string());
        env.insert(
            "artifact_root".to_string(),
            root.to_string_lossy().into_owned(),
        );
        FileDownloader::new(ConfigCache::new(env))
    }

    fn store() -> SqliteStatsStore {
        let store = SqliteStatsStore::open_in_memory().unwrap();
        store.create_schema().unwrap();
        store
    }

    fn call(downloader: &FileDownloader, db: &dyn StatsStore, payload: &str) -> Result<Value> {
        let payload = downloader.call(
            &RpcContext::new(DepotConfig::RPC_NAME),
            &RecordingLogger::default(),
            db,
            &FsArtifactSource,
            payload,
        )?;
        Ok(serde_json::from_str(&payload).unwrap())
    }

    #[test]
    fn test_blank_payload_serves_default_artifact() {
        let root = create_artifact_root();
        let response = call(&downloader(root.path()), &store(), "").unwrap();

        assert_eq!(response["type"], "core");
        assert_eq!(response["version"], "1.0.0");
        assert_eq!(response["hash"], "2358080557");
        assert_eq!(response["content"], r#"{"core": "1.0.0"}"#);
    }

    #[test]
    fn test_download_counts_statistics() {
        let root = create_artifact_root();
        let db = store();
        let downloader = downloader(root.path());
        let expected_path = root.path().join("custom/5.0.0.json");
        let file_name = expected_path.to_string_lossy();

        call(&downloader, &db, r#"{"type":"custom","version":"5.0.0"}"#).unwrap();
        assert_eq!(db.download_count(&file_name, "3181399843").unwrap(), Some(1));

        call(&downloader, &db, r#"{"type":"custom","version":"5.0.0"}"#).unwrap();
        assert_eq!(db.download_count(&file_name, "3181399843").unwrap(), Some(2));
    }

    #[test]
    fn test_mismatch_is_not_counted() {
        let root = create_artifact_root();
        let db = store();
        let response = call(
            &downloader(root.path()),
            &db,
            r#"{"type":"custom","version":"5.0.0","hash":"notcrc32"}"#,
        )
        .unwrap();

        assert_eq!(response["hash"], "notcrc32");
        assert_eq!(response["content"], Value::Null);

        let file_name = root.path().join("custom/5.0.0.json");
        assert_eq!(
            db.download_count(&file_name.to_string_lossy(), "3181399843")
                .unwrap(),
            None
        );
        assert_eq!(
            db.download_count(&file_name.to_string_lossy(), "notcrc32")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_missing_artifact_names_path() {
        let root = create_artifact_root();
        let err = call(
            &downloader(root.path()),
            &store(),
            r#"{"type":"non_existing_type","version":"5.0.0"}"#,
        )
        .unwrap_err();

        let expected = root.path().join("non_existing_type/5.0.0.json");
        assert_eq!(
            err.to_string(),
            format!("File not found on path: {}", expected.display())
        );
    }

    #[test]
    fn test_traversal_rejected_before_filesystem_access() {
        let root = create_artifact_root();
        let downloader = downloader(root.path());
        let source = CountingSource::default();
        let logger = RecordingLogger::default();

        for payload in [
            r#"{"type":"../../core","version":"5.0.0"}"#,
            r#"{"type":"core","version":"../5.0.0"}"#,
            r#"{"type":"..","version":"1.0.0"}"#,
        ] {
            let err = downloader
                .download(&logger, &store(), &source, payload, ContentEncoding::Text)
                .unwrap_err();
            assert!(matches!(err, DepotError::InvalidArgument { .. }));
        }
        assert!(source.reads().is_empty());
    }

    #[test]
    fn test_missing_root_is_misconfiguration() {
        let mut env = HashMap::new();
        env.insert("default_type".to_string(), "core".to_string());
        env.insert("default_version".to_string(), "1.0.0".to_string());
        let downloader = FileDownloader::new(ConfigCache::new(env));

        let err = call(&downloader, &store(), "").unwrap_err();
        assert!(matches!(err, DepotError::Misconfiguration { .. }));
        assert_eq!(err.to_rpc_error_code(), -32603);
    }

    #[test]
    fn test_statistics_failure_does_not_fail_download() {
        let root = create_artifact_root();
        // No schema, so every upsert fails
        let db = SqliteStatsStore::open_in_memory().unwrap();
        let logger = RecordingLogger::default();

        let payload = downloader(root.path())
            .download(&logger, &db, &FsArtifactSource, "", ContentEncoding::Text)
            .unwrap();

        let response: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(response["content"], r#"{"core": "1.0.0"}"#);
        let errors = logger.at("error");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to record download statistics"));
    }

    #[test]
    fn test_unencodable_artifact_is_not_counted() {
        let root = create_artifact_root();
        std::fs::create_dir_all(root.path().join("bin")).unwrap();
        let artifact = root.path().join("bin/1.0.0.json");
        std::fs::write(&artifact, b"\xff\xfe\x00").unwrap();
        let db = store();

        let err = call(
            &downloader(root.path()),
            &db,
            r#"{"type":"bin","version":"1.0.0"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DepotError::SerializationFailure { .. }));

        let hash = checksum(b"\xff\xfe\x00");
        assert_eq!(
            db.download_count(&artifact.to_string_lossy(), &hash).unwrap(),
            None
        );
    }

    #[test]
    fn test_base64_content_encoding() {
        let root = create_artifact_root();
        let mut env = HashMap::new();
        env.insert("default_type".to_string(), "core".to_string());
        env.insert("default_version".to_string(), "1.0.0".to_string());
        env.insert(
            "artifact_root".to_string(),
            root.path().to_string_lossy().into_owned(),
        );
        env.insert("content_encoding".to_string(), "base64".to_string());
        let downloader = FileDownloader::new(ConfigCache::new(env));

        let response = call(&downloader, &store(), "").unwrap();
        assert_eq!(response["content"], "eyJjb3JlIjogIjEuMC4wIn0=");
    }
}
