//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Chain IDs the client accepts.
pub const SUPPORTED_CHAINS: [u64; 2] = [534_352, 534_351];

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    name = %config.client.name,
    chain_id = config.network.chain_id,
    dry_run = config.client.dry_run,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.client.name.trim().is_empty(),
    "client.name must not be empty"
  );

  anyhow::ensure!(
    ["trace", "debug", "info", "warn", "error"].contains(&config.client.log_level.as_str()),
    "Unknown log_level {:?}",
    config.client.log_level
  );

  // Network validation
  let url = config.network.rpc_url.as_str();
  anyhow::ensure!(
    ["http://", "https://", "ws://", "wss://"]
      .iter()
      .any(|scheme| url.starts_with(scheme)),
    "network.rpc_url must be an http(s) or ws(s) URL, got {url:?}"
  );
  anyhow::ensure!(
    SUPPORTED_CHAINS.contains(&config.network.chain_id),
    "network.chain_id must be Scroll (534352) or Scroll Sepolia (534351), got {}",
    config.network.chain_id
  );
  anyhow::ensure!(
    config.network.timeout_seconds > 0,
    "network.timeout_seconds must be positive"
  );

  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "persistence.data_dir must not be empty"
  );

  // Metrics validation
  anyhow::ensure!(
    config.metrics.refresh_seconds > 0,
    "metrics.refresh_seconds must be positive"
  );
  if config.metrics.enabled {
    config
      .metrics
      .bind_address
      .parse::<std::net::SocketAddr>()
      .with_context(|| format!("Invalid metrics.bind_address {}", config.metrics.bind_address))?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINIMAL: &str = r#"
    [client]
    name = "caribou"

    [network]
    rpc_url = "https://rpc.scroll.io"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = parse_config(MINIMAL).unwrap();
    assert_eq!(config.network.chain_id, 534_352);
    assert_eq!(config.client.log_level, "info");
    assert!(!config.client.dry_run);
    assert_eq!(config.persistence.data_dir, "data");
    assert_eq!(config.metrics.refresh_seconds, 60);
  }

  #[test]
  fn test_rejects_foreign_chain() {
    let toml = format!("{MINIMAL}\nchain_id = 1\n");
    let err = parse_config(&toml).unwrap_err();
    assert!(err.to_string().contains("chain_id"));
  }

  #[test]
  fn test_rejects_bad_rpc_scheme() {
    let toml = MINIMAL.replace("https://rpc.scroll.io", "rpc.scroll.io");
    assert!(parse_config(&toml).is_err());
  }

  #[test]
  fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, MINIMAL).unwrap();
    let config = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(config.client.name, "caribou");
  }
}
