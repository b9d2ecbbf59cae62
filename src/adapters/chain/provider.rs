//! Scroll RPC Provider - alloy-rs 0.9 Connection and Wallet Session
//!
//! Connects to Scroll via alloy-rs and binds the wallet session:
//! - `PRIVATE_KEY` set: signing session, writes are enabled
//! - `WALLET_ADDRESS` set: watch-only session, reads only
//! - neither: disconnected, every operation needing an account fails
//!
//! The provider is stored type-erased as `dyn Provider` so that the
//! signing and read-only filler stacks share one adapter type.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use crate::config::NetworkConfig;

/// Scroll mainnet chain ID.
pub const SCROLL_MAINNET: u64 = 534_352;

/// Scroll Sepolia chain ID.
pub const SCROLL_SEPOLIA: u64 = 534_351;

/// How the current session is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Disconnected,
    WatchOnly(Address),
    Signing(Address),
}

impl Session {
    pub const fn account(self) -> Option<Address> {
        match self {
            Self::Disconnected => None,
            Self::WatchOnly(a) | Self::Signing(a) => Some(a),
        }
    }

    pub const fn can_sign(self) -> bool {
        matches!(self, Self::Signing(_))
    }
}

/// Shared Scroll RPC provider backed by alloy-rs 0.9.
pub struct ScrollProvider {
    provider: Arc<dyn Provider + Send + Sync>,
    session: Session,
    chain_id: u64,
}

impl ScrollProvider {
    /// Connect using the session secrets from the environment.
    pub async fn connect(config: &NetworkConfig) -> Result<Self> {
        let private_key = std::env::var("PRIVATE_KEY").ok();
        let watch_address = std::env::var("WALLET_ADDRESS").ok();
        Self::connect_with(config, private_key.as_deref(), watch_address.as_deref()).await
    }

    /// Connect and validate the chain ID.
    ///
    /// A private key takes precedence over a watch address.
    #[instrument(skip_all, fields(chain_id = config.chain_id))]
    pub async fn connect_with(
        config: &NetworkConfig,
        private_key: Option<&str>,
        watch_address: Option<&str>,
    ) -> Result<Self> {
        let (provider, session): (Arc<dyn Provider + Send + Sync>, Session) = match private_key {
            Some(key) => {
                let signer: PrivateKeySigner =
                    key.trim().parse().context("Invalid PRIVATE_KEY")?;
                let account = signer.address();
                let provider = ProviderBuilder::new()
                    .with_recommended_fillers()
                    .wallet(EthereumWallet::from(signer))
                    .on_builtin(&config.rpc_url)
                    .await
                    .context("Failed to connect to RPC")?;
                (Arc::new(provider), Session::Signing(account))
            }
            None => {
                let provider = ProviderBuilder::new()
                    .with_recommended_fillers()
                    .on_builtin(&config.rpc_url)
                    .await
                    .context("Failed to connect to RPC")?;
                let session = match watch_address {
                    Some(a) => Session::WatchOnly(
                        a.trim().parse().context("Invalid WALLET_ADDRESS")?,
                    ),
                    None => Session::Disconnected,
                };
                (Arc::new(provider), session)
            }
        };

        let chain_id = tokio::time::timeout(
            std::time::Duration::from_secs(config.timeout_seconds),
            provider.get_chain_id(),
        )
        .await
        .context("Timed out querying chain ID")?
        .context("Failed to query chain ID")?;

        if chain_id != config.chain_id {
            bail!(
                "Expected chain_id={}, RPC reports {chain_id}",
                config.chain_id
            );
        }
        if chain_id != SCROLL_MAINNET && chain_id != SCROLL_SEPOLIA {
            warn!(chain_id, "Connected to a chain that is not Scroll");
        }

        match session {
            Session::Signing(a) => info!(chain_id, account = %a, "Connected with signing wallet"),
            Session::WatchOnly(a) => info!(chain_id, account = %a, "Connected watch-only"),
            Session::Disconnected => warn!(chain_id, "Connected without a wallet session"),
        }

        Ok(Self {
            provider,
            session,
            chain_id,
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub const fn session(&self) -> Session {
        self.session
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_account() {
        let a = Address::repeat_byte(7);
        assert_eq!(Session::Disconnected.account(), None);
        assert_eq!(Session::WatchOnly(a).account(), Some(a));
        assert!(!Session::WatchOnly(a).can_sign());
        assert!(Session::Signing(a).can_sign());
    }
}
