//! Console server
//!
//! Serves the router over TLS and shuts down gracefully: SIGINT/SIGTERM stops
//! accepting connections, in-flight requests get a fixed grace period, then
//! remaining connections are closed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use tokio::signal;
use tracing::{info, warn};

use super::router::{AppState, create_router};
use crate::config::Config;
use crate::{Error, Result};

/// Grace period for in-flight requests on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Console HTTP server
pub struct ConsoleServer {
    /// Configuration
    config: Config,
}

impl ConsoleServer {
    /// Create a new server
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS material cannot be loaded or the listen
    /// address cannot be bound. Both are fatal startup failures.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        if !self.config.oauth.has_credentials() {
            warn!("CLIENT_ID/CLIENT_SECRET not configured - sign-in will fail");
        }

        let tls = RustlsConfig::from_pem_file(
            &self.config.server.tls.cert,
            &self.config.server.tls.key,
        )
        .await
        .map_err(|e| {
            Error::Config(format!(
                "Failed to load TLS material ({}, {}): {e}",
                self.config.server.tls.cert, self.config.server.tls.key
            ))
        })?;

        let state = Arc::new(AppState::new(Arc::new(self.config.clone())));
        let app = create_router(state);

        let handle: Handle<SocketAddr> = Handle::new();
        tokio::spawn(shutdown_signal(handle.clone()));

        info!(host = %self.config.server.host, port = self.config.server.port, "Listening (TLS)");
        info!(redirect_uri = %self.config.oauth.redirect_uri, "Callback redirect URI");

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        info!("Server exiting");
        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
