//! Ingress HTTP server lifecycle.
//!
//! [`start_server`] binds the configured address and serves until `Ctrl-C`.
//! In-flight requests finish before it returns, so no accepted observation
//! is cut off between validation and its publish ack. [`bind`] and
//! [`serve`] are the two halves, for callers that pick their own port or
//! shutdown trigger.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::publisher::Publisher;
use crate::router::build_router;
use crate::state::AppState;

/// Bind address for the ingress server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port; `0` picks a free one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// Bind and serve until `Ctrl-C`, then drain in-flight requests.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or taken and
/// [`ServerError::Serve`] on a fatal I/O error.
pub async fn start_server<P: Publisher>(
    config: &ServerConfig,
    state: Arc<AppState<P>>,
) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    serve(listener, state, shutdown_signal()).await
}

/// Open a listener on the configured address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or cannot be
/// bound.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
}

/// Serve the ingress router on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<P, F>(
    listener: TcpListener,
    state: Arc<AppState<P>>,
    shutdown: F,
) -> Result<(), ServerError>
where
    P: Publisher,
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Serve(format!("listener has no address: {e}")))?;
    info!(%addr, subject = %state.subject, "ingress server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!(%addr, "ingress server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, draining requests"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Errors that can occur when starting or running the ingress server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
