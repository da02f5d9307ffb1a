//! Admin server binary.
//!
//! ```text
//! admin-server --config admin.toml
//!
//!   config ─▶ AdminServer::new ─▶ start ─▶ (serving task) ─▶ signal ─▶ stop
//! ```

use std::path::PathBuf;

use clap::Parser;

use admin_server::config::{load_config, Config};
use admin_server::lifecycle::shutdown_signal;
use admin_server::observability::logging;
use admin_server::{AdminServer, StatusService};

#[derive(Parser)]
#[command(name = "admin-server")]
#[command(about = "Administrative API server", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_addr = %config.admin.bind_addr,
        port = config.admin.port,
        "Configuration loaded"
    );

    let service = StatusService::from_config(&config.admin);
    let Some(mut server) = AdminServer::new(&config.admin, service) else {
        tracing::info!("admin server disabled");
        return Ok(());
    };

    server.start().await?;
    shutdown_signal().await;
    server.stop()?;

    tracing::info!("Shutdown complete");
    Ok(())
}
