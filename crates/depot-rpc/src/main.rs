//! Depot RPC Server - JSON-RPC host for the artifact downloader.
//!
//! This binary initialises the depot module (statistics schema and RPC
//! registration) and serves registered RPCs over JSON-RPC 2.0.
//!
//! Artifact configuration comes from the environment: `default_type`,
//! `default_version`, `artifact_root` and optionally `content_encoding`.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use depot_core::{init_module, FileDownloader, RpcRegistry, SqliteStatsStore, TracingLogger};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "depot-rpc")]
#[command(about = "JSON-RPC server for versioned artifact downloads")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Download statistics database file
    #[arg(long, default_value = "depot.db")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Depot RPC Server");
    info!("Statistics database: {}", args.database.display());

    let store = SqliteStatsStore::open(&args.database)?;
    let mut registry = RpcRegistry::new();
    init_module(
        &TracingLogger,
        &store,
        &mut registry,
        FileDownloader::from_env(),
    )?;

    let addr = server::start_server(registry, store, &args.host, args.port).await?;

    // Intentional stdout: callers read the bound port from here
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
