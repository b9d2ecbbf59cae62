//! Registry Validator - On-chain Verification of Known Addresses
//!
//! Checks that every address in the compiled-in registry has deployed
//! code on the connected chain. A registry entry without code means
//! the client is pointed at the wrong network.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use futures_util::future::join_all;
use tracing::{info, instrument, warn};

/// Result of validating a single contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Registry name for logging.
    pub name: String,
    pub address: Address,
    /// Whether the address has deployed code.
    pub has_code: bool,
}

/// Validates registry addresses against on-chain state.
pub struct RegistryValidator {
    provider: Arc<dyn Provider + Send + Sync>,
}

impl RegistryValidator {
    pub fn new(provider: Arc<dyn Provider + Send + Sync>) -> Self {
        Self { provider }
    }

    /// Validate every `(name, address)` pair concurrently.
    ///
    /// Fails only on RPC errors; missing code is reported per entry.
    #[instrument(skip_all, fields(count = entries.len()))]
    pub async fn validate_all(&self, entries: &[(String, Address)]) -> Result<Vec<ValidationResult>> {
        let checks = entries
            .iter()
            .map(|(name, address)| self.validate_contract(name, *address));

        let results = join_all(checks)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        for r in &results {
            if r.has_code {
                info!(contract = %r.name, address = %r.address, "Contract validated");
            } else {
                warn!(
                    contract = %r.name,
                    address = %r.address,
                    "No code at address, wrong network?"
                );
            }
        }

        let missing = results.iter().filter(|r| !r.has_code).count();
        info!(validated = results.len(), missing, "Registry validation complete");
        Ok(results)
    }

    async fn validate_contract(&self, name: &str, address: Address) -> Result<ValidationResult> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code for {name}"))?;

        Ok(ValidationResult {
            name: name.to_string(),
            address,
            has_code: !code.is_empty(),
        })
    }
}
