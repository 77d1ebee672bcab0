//! RAX File Server - Entry Point
//!
//! Serves upload, list, and download over a line-framed RPC gateway and an
//! optional browser gateway.

use log::{error, info};

use rax_file_server::config::ServerConfig;
use rax_file_server::server;
use rax_file_server::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    // env_logger picks up RUST_LOG; defaults to info
    setup_logging();

    info!("Launching file server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(config).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
