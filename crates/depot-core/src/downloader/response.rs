//! Download response assembly and serialization.

use super::integrity::Integrity;
use super::request::DownloadRequest;
use crate::config::ContentEncoding;
use crate::error::{DepotError, Result};
use base64::Engine as _;
use serde::Serialize;
use std::borrow::Cow;

/// Result of a download request.
///
/// `content` is present only when the artifact was found and passed the
/// integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResponse {
    pub artifact_type: String,
    pub version: String,
    pub hash: Option<String>,
    pub content: Option<Vec<u8>>,
}

/// Wire shape of [`DownloadResponse`].
#[derive(Serialize)]
struct WireResponse<'a> {
    #[serde(rename = "type")]
    artifact_type: &'a str,
    version: &'a str,
    hash: Option<&'a str>,
    content: Option<Cow<'a, str>>,
}

impl DownloadResponse {
    /// Apply the integrity policy: content is withheld on a hash mismatch.
    pub fn from_artifact(request: DownloadRequest, bytes: Vec<u8>) -> Self {
        let integrity = Integrity::check(&bytes, request.hash.as_deref());
        let content = integrity.is_verified().then_some(bytes);
        Self {
            artifact_type: request.artifact_type,
            version: request.version,
            hash: Some(integrity.hash().to_string()),
            content,
        }
    }

    /// Serialize to the JSON payload.
    pub fn to_payload(&self, encoding: ContentEncoding) -> Result<String> {
        let content = match &self.content {
            None => None,
            Some(bytes) => Some(encode_content(bytes, encoding)?),
        };

        let wire = WireResponse {
            artifact_type: &self.artifact_type,
            version: &self.version,
            hash: self.hash.as_deref(),
            content,
        };

        serde_json::to_string(&wire).map_err(|e| DepotError::SerializationFailure {
            message: e.to_string(),
        })
    }
}

fn encode_content(bytes: &[u8], encoding: ContentEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        ContentEncoding::Text => std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(|e| {
            DepotError::SerializationFailure {
                message: format!("artifact is not valid UTF-8 text: {}", e),
            }
        }),
        ContentEncoding::Base64 => Ok(Cow::Owned(
            base64::engine::general_purpose::STANDARD.encode(bytes),
        )),
    }
}
