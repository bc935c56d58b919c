//! Host capabilities injected into RPC functions.
//!
//! The host owns logging, storage and file access. RPC functions only see
//! these narrow traits so tests can substitute doubles for each of them.

mod context;
mod registry;

pub use context::{CancellationToken, RpcContext};
pub use registry::{Initializer, RpcFunction, RpcRegistry, RpcReply};

use std::path::Path;

/// Leveled logger supplied by the host.
pub trait RpcLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// [`RpcLogger`] that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RpcLogger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Read access to artifact bytes.
pub trait ArtifactSource: Send + Sync {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads artifacts straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactSource;

impl ArtifactSource for FsArtifactSource {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
