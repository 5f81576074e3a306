//! RAX Filesystem Server - Entry Point
//!
//! An HTTP file service confined to a fixed set of allowed directories,
//! with token-confirmed deletes.

use log::{error, info};
use std::process::ExitCode;

use rax_fs_server::Server;
use rax_fs_server::config::ServerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching filesystem server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let roots = match config.allowed_roots() {
        Ok(roots) => roots,
        Err(e) => {
            error!("Invalid allowed directories: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::new(config, roots).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
