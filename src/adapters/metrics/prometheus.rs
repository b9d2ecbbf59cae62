//! Prometheus Metrics Registry - Client Observability
//!
//! Registers and exposes Prometheus metrics for the monitor mode.
//! Covers transaction outcomes, reconciled balances and read errors.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Centralized Prometheus metrics for the client.
///
/// All metrics follow the naming convention `caribou_*`.
pub struct MetricsRegistry {
    registry: Registry,
    /// Transactions by operation label and outcome.
    pub transactions: IntCounterVec,
    /// Supplied balance per earn market, in the underlying asset.
    pub supplied_balance: GaugeVec,
    /// Wallet balance of each earn market's underlying asset.
    pub wallet_balance: GaugeVec,
    /// Balance reads that degraded to the error sentinel.
    pub read_errors: IntCounterVec,
    /// Points total per address.
    pub points_total: GaugeVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transactions = IntCounterVec::new(
            Opts::new("caribou_transactions_total", "Transactions by operation and outcome"),
            &["operation", "outcome"],
        )?;

        let supplied_balance = GaugeVec::new(
            Opts::new(
                "caribou_supplied_balance",
                "Supplied balance per earn market in the underlying asset",
            ),
            &["market", "protocol"],
        )?;

        let wallet_balance = GaugeVec::new(
            Opts::new(
                "caribou_wallet_balance",
                "Wallet balance of the earn market's underlying asset",
            ),
            &["market", "asset"],
        )?;

        let read_errors = IntCounterVec::new(
            Opts::new("caribou_read_errors_total", "Balance reads that failed"),
            &["market", "kind"],
        )?;

        let points_total = GaugeVec::new(
            Opts::new("caribou_points_total", "Cosmetic points total per address"),
            &["address"],
        )?;

        registry.register(Box::new(transactions.clone()))?;
        registry.register(Box::new(supplied_balance.clone()))?;
        registry.register(Box::new(wallet_balance.clone()))?;
        registry.register(Box::new(read_errors.clone()))?;
        registry.register(Box::new(points_total.clone()))?;

        Ok(Self {
            registry,
            transactions,
            supplied_balance,
            wallet_balance,
            read_errors,
            points_total,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
