use axum::Router;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::routes::build_router;
use crate::server::state::{AppState, SharedState};
use crate::storage::validation::AllowedRoots;

pub struct Server {
    listener: TcpListener,
    state: SharedState,
    config: Arc<ServerConfig>,
}

impl Server {
    pub async fn new(config: ServerConfig, roots: AllowedRoots) -> std::io::Result<Self> {
        let listen_addr = config.listen_addr();

        let listener = match TcpListener::bind(&listen_addr).await {
            Ok(listener) => {
                info!("Server bound to {}", listen_addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", listen_addr, e);
                return Err(e);
            }
        };

        Ok(Self {
            listener,
            state: AppState::with_roots(roots),
            config: Arc::new(config),
        })
    }

    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    pub async fn start(self) -> std::io::Result<()> {
        info!(
            "Starting RAX filesystem server on {} ({} allowed directories)",
            self.config.listen_addr(),
            self.state.guard.roots().len()
        );

        spawn_confirmation_sweeper(Arc::clone(&self.state), &self.config);

        let router = self.router();
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Periodically evict expired delete confirmations
fn spawn_confirmation_sweeper(state: SharedState, config: &ServerConfig) {
    let period = config.sweep_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            state.broker.sweep();
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
