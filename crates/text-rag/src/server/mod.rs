//! HTTP server

pub mod routes;
pub mod state;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use state::AppState;
use std::net::SocketAddr;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// The RAG HTTP server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Initialize application state and create the server
    pub async fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::initialize(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Create a server around existing state
    pub fn with_state(config: RagConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes and middleware
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready))
            .nest("/api", routes::api_routes())
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }

    /// Address the server binds to
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }

    /// Start serving requests. Runs until the process is stopped.
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::config(format!("Invalid server address {}: {}", self.address(), e)))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "Server listening");

        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "no chunks indexed")
    }
}
