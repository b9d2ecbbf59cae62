//! Health Check Server - Liveness and Readiness Endpoints
//!
//! Exposes /live and /ready endpoints via axum 0.7 for the monitor
//! mode. Readiness depends on chain client health and on the action
//! log being usable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Shared health state polled by readiness checks.
#[derive(Debug)]
pub struct HealthState {
    /// Whether the RPC answered the last health check.
    pub chain_healthy: AtomicBool,
    /// Whether the action log is readable.
    pub store_healthy: AtomicBool,
    /// Cleared during shutdown.
    pub running: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (all healthy by default).
    pub const fn new() -> Self {
        Self {
            chain_healthy: AtomicBool::new(true),
            store_healthy: AtomicBool::new(true),
            running: AtomicBool::new(true),
        }
    }

    pub fn set_chain(&self, healthy: bool) {
        self.chain_healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn set_store(&self, healthy: bool) {
        self.store_healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Check if the client is ready to serve.
    pub fn is_ready(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.chain_healthy.load(Ordering::Relaxed)
            && self.store_healthy.load(Ordering::Relaxed)
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    state: Arc<HealthState>,
    port: u16,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Router with both endpoints, exposed for in-process tests.
    pub fn router(state: Arc<HealthState>) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(state)
    }

    /// Run the health check server until shutdown.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Self::router(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness check: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness check: returns 200 only if chain and store are healthy.
    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_requires_all_flags() {
        let state = HealthState::new();
        assert!(state.is_ready());
        state.set_chain(false);
        assert!(!state.is_ready());
        state.set_chain(true);
        state.stop();
        assert!(!state.is_ready());
    }
}
