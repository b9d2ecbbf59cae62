//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`. Secrets
//! (the signing key or watch address) never live here; they are read
//! from the environment by the chain adapter. Contract addresses are
//! part of the compiled-in registry, not configuration.

pub mod loader;

use serde::Deserialize;

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Client identity and run mode.
  pub client: ClientConfig,
  /// Scroll RPC connection.
  pub network: NetworkConfig,
  /// Action log storage.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Build and log transactions without sending them.
  #[serde(default)]
  pub dry_run: bool,
}

/// RPC connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// Scroll RPC endpoint (http(s) or ws(s)).
  pub rpc_url: String,
  /// Expected chain ID (534352 mainnet, 534351 Sepolia).
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// Connection timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export in monitor mode.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
  /// Balance refresh interval in monitor mode (seconds).
  #[serde(default = "default_refresh")]
  pub refresh_seconds: u64,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
      refresh_seconds: default_refresh(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory holding `user_points.json`.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_chain_id() -> u64 {
  534_352
}

fn default_timeout() -> u64 {
  30
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}

fn default_refresh() -> u64 {
  60
}

fn default_data_dir() -> String {
  "data".to_string()
}
