//! Balance Reconciliation Use Case
//!
//! Reads the raw on-chain amounts behind an earn market and derives
//! the balances a user sees:
//! - supplied: share balance × exchange rate (Rho) or aToken balance
//! - wallet: underlying ERC-20 balance available to deposit
//!
//! Reads for one market run concurrently. Failures degrade to the
//! `"Error"` display sentinel; nothing is retried.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use tracing::{instrument, warn};

use crate::domain::balance::{DisplayBalance, PositionBalance};
use crate::domain::market::{BalanceSource, EarnMarket};
use crate::ports::chain_client::ChainClient;

/// Both balances of one market, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnBalances {
  /// Supplied position; `None` when the read failed.
  pub position: Option<PositionBalance>,
  /// Wallet balance of the underlying asset.
  pub wallet: DisplayBalance,
  /// Raw wallet units; `None` when the read failed.
  pub wallet_units: Option<U256>,
}

impl EarnBalances {
  /// Supplied balance for display.
  pub fn supplied(&self) -> DisplayBalance {
    self
      .position
      .as_ref()
      .map_or(DisplayBalance::Error, |p| p.display.clone())
  }
}

/// Derives display balances from chain reads.
pub struct BalanceReconciler<C: ChainClient> {
  chain: Arc<C>,
}

impl<C: ChainClient> Clone for BalanceReconciler<C> {
  fn clone(&self) -> Self {
    Self {
      chain: Arc::clone(&self.chain),
    }
  }
}

impl<C: ChainClient> BalanceReconciler<C> {
  pub fn new(chain: Arc<C>) -> Self {
    Self { chain }
  }

  /// Supplied position of `account` in `market`.
  #[instrument(skip(self, market), fields(market = market.name, protocol = %market.protocol))]
  pub async fn position(&self, market: &EarnMarket, account: Address) -> Result<PositionBalance> {
    match market.protocol.balance_source() {
      BalanceSource::ExchangeRate => {
        let (shares, rate) = tokio::try_join!(
          self.chain.balance_of(market.address, account),
          self.chain.exchange_rate_stored(market.address),
        )
        .context("Failed to read share balance and exchange rate")?;

        PositionBalance::from_shares(shares, rate, market.decimals)
          .context("Share balance × exchange rate overflowed")
      }
      BalanceSource::AToken => {
        let raw = self
          .chain
          .balance_of(market.position_token(), account)
          .await
          .context("Failed to read aToken balance")?;

        Ok(PositionBalance::from_underlying(raw, market.decimals))
      }
    }
  }

  /// Raw underlying token balance in the wallet.
  pub async fn wallet_units(&self, market: &EarnMarket, account: Address) -> Result<U256> {
    self
      .chain
      .balance_of(market.token, account)
      .await
      .with_context(|| format!("Failed to read {} wallet balance", market.asset))
  }

  /// Read both balances concurrently; failures degrade per balance.
  ///
  /// Returns `None` when no wallet is connected.
  pub async fn reconcile(&self, market: &EarnMarket) -> Option<EarnBalances> {
    let account = self.chain.account()?;

    let (position, wallet) = tokio::join!(
      self.position(market, account),
      self.wallet_units(market, account),
    );

    let position = match position {
      Ok(p) => Some(p),
      Err(e) => {
        warn!(market = market.name, protocol = %market.protocol, error = %e, "Failed to fetch balance");
        None
      }
    };

    let (wallet, wallet_units) = match wallet {
      Ok(raw) => (DisplayBalance::from_units(raw, market.decimals), Some(raw)),
      Err(e) => {
        warn!(asset = market.asset, error = %e, "Failed to fetch wallet balance");
        (DisplayBalance::Error, None)
      }
    };

    Some(EarnBalances {
      position,
      wallet,
      wallet_units,
    })
  }
}
