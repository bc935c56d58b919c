//! Module initialisation: schema setup and RPC registration.

use crate::config::DepotConfig;
use crate::downloader::FileDownloader;
use crate::error::Result;
use crate::runtime::{Initializer, RpcLogger};
use crate::stats::StatsStore;
use std::sync::Arc;

/// Prepare the statistics schema and register the downloader.
///
/// Called once by the host at startup. Each failure is logged at error level
/// and returned.
pub fn init_module(
    logger: &dyn RpcLogger,
    db: &dyn StatsStore,
    initializer: &mut dyn Initializer,
    downloader: FileDownloader,
) -> Result<()> {
    if let Err(e) = db.create_schema() {
        logger.error(&format!("Failed to create DB schema: {}", e));
        return Err(e);
    }

    if let Err(e) = initializer.register_rpc(DepotConfig::RPC_NAME, Arc::new(downloader)) {
        logger.error(&format!("Failed to register the downloader rpc: {}", e));
        return Err(e);
    }

    logger.info(&format!("Registered {} rpc", DepotConfig::RPC_NAME));
    Ok(())
}
