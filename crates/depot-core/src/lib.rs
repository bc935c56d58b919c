//! Depot Core - versioned artifact downloads for a game backend.
//!
//! This crate provides the `FileDownloader` RPC: it serves typed, versioned
//! artifacts from a configured root, checks them against an optional CRC-32
//! expectation and counts verified deliveries. Host services (logging, the
//! statistics database, file access) are injected through narrow traits.
//!
//! For the HTTP host, see the `depot-rpc` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use depot_core::{
//!     init_module, FileDownloader, FsArtifactSource, RpcContext, RpcRegistry,
//!     SqliteStatsStore, TracingLogger,
//! };
//!
//! fn main() -> depot_core::Result<()> {
//!     let db = SqliteStatsStore::open("depot.db")?;
//!     let mut registry = RpcRegistry::new();
//!     init_module(&TracingLogger, &db, &mut registry, FileDownloader::from_env())?;
//!
//!     let reply = registry.invoke(
//!         &RpcContext::new("FileDownloader"),
//!         &TracingLogger,
//!         &db,
//!         &FsArtifactSource,
//!         r#"{"type":"core","version":"1.0.0"}"#,
//!     );
//!     println!("{}", reply.payload);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod downloader;
pub mod error;
pub mod runtime;
pub mod stats;

mod module;

// Re-export commonly used types
pub use config::{ConfigCache, ContentEncoding, DepotConfig, EnvSource, ProcessEnv};
pub use downloader::{DownloadRequest, DownloadResponse, FileDownloader};
pub use error::{DepotError, Result};
pub use module::init_module;
pub use runtime::{
    ArtifactSource, CancellationToken, FsArtifactSource, Initializer, RpcContext, RpcFunction,
    RpcLogger, RpcRegistry, RpcReply, TracingLogger,
};
pub use stats::{SqliteStatsStore, StatsStore};
