//!
//! authgate HTTP server
//! --------------------
//! Axum router and listener for the authentication API.
//!
//! Responsibilities:
//! - Registration of identities with a generated one-time credential.
//! - Login against the identity store, issuing HS256 bearer tokens.
//! - A profile endpoint reachable only through the bearer-token gate.
//! - JSON error bodies for bad input, wrong methods and unknown paths.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::identity::{require_bearer, AuthProvider, MemoryIdentityStore, SharedIdentityStore, TokenService};

pub mod routes;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthProvider,
}

impl AppState {
    pub fn new(store: SharedIdentityStore, tokens: Arc<TokenService>) -> Self {
        Self { auth: AuthProvider::new(store, tokens) }
    }

    /// Fresh in-memory store and a token service keyed with `secret`.
    pub fn in_memory(secret: &[u8]) -> Self {
        Self::new(Arc::new(MemoryIdentityStore::new()), Arc::new(TokenService::new(secret)))
    }
}

/// Build the full router. Every route rejects foreign methods with a JSON 405
/// before any other check runs; `/api/profile` sits behind the bearer gate.
/// axum answers HEAD with the GET handler unless HEAD has its own endpoint, so
/// GET routes register HEAD as a 405.
pub fn router(state: AppState) -> Router {
    let gate = middleware::from_fn_with_state(state.auth.tokens().clone(), require_bearer);
    Router::new()
        .route("/health", get(routes::health).head(routes::get_only).fallback(routes::get_only))
        .route("/api/register", post(routes::register).fallback(routes::post_only))
        .route("/api/login", post(routes::login).fallback(routes::post_only))
        .route("/api/profile", get(routes::profile).route_layer(gate).head(routes::get_only).fallback(routes::get_only))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn log_startup(addr: &SocketAddr) {
    info!(target: "startup", "authgate listening on {}", addr);
    info!(target: "startup", "endpoints: GET /health, POST /api/register, POST /api/login, GET /api/profile (bearer token)");
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::in_memory(config.secret());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log_startup(&listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!(target: "startup", "authgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
