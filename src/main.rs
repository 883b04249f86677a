//! Toy House Server
//!
//! REST backend for toy marketplace listings, backed by MongoDB.

use clap::{Arg, ArgMatches, Command};
use tokio::signal;
use tracing::{info, warn};
use toy_house::api::start_server;
use toy_house::core::{create_app_state, Config};
use toy_house::{Error, Result};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("toy-house")
        .version(toy_house::VERSION)
        .about("REST backend for toy marketplace listings.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address")
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("HTTP port, keeps the bind host")
        )
        .arg(
            Arg::new("storage-type")
                .long("storage-type")
                .value_name("TYPE")
                .help("Storage backend type (mongo, memory)")
        )
        .arg(
            Arg::new("mongodb-uri")
                .long("mongodb-uri")
                .value_name("URI")
                .help("MongoDB connection string")
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .help("Number of worker threads")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .get_matches();

    // Load configuration
    let mut config = Config::load(matches.get_one::<String>("config").map(String::as_str))?;

    // Apply CLI overrides
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    toy_house::init(&config.logging)?;
    info!("Starting Toy House v{}", toy_house::VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.optimal_worker_threads())
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    info!(
        "Using {} worker threads, storage: {:?}",
        config.optimal_worker_threads(),
        config.storage.storage_type
    );

    let state = create_app_state(config).await?;
    start_server(state, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr.parse()
            .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(port) = matches.get_one::<String>("port") {
        let port: u16 = port.parse()
            .map_err(|e| Error::config(format!("Invalid port: {}", e)))?;
        config.server.http_addr.set_port(port);
    }

    if let Some(storage_type) = matches.get_one::<String>("storage-type") {
        config.storage.storage_type = storage_type.parse()?;
    }

    if let Some(uri) = matches.get_one::<String>("mongodb-uri") {
        config.storage.uri = Some(uri.clone());
    }

    if let Some(workers) = matches.get_one::<String>("workers") {
        config.performance.worker_threads = workers.parse()
            .map_err(|e| Error::config(format!("Invalid worker count: {}", e)))?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    warn!("Received shutdown signal, initiating graceful shutdown...");
}
