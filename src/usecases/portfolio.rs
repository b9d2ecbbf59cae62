//! Portfolio Use Case - Holdings Across the Registry
//!
//! Aggregates the connected account's NFT holdings and earn positions.
//! Every read is independent and runs concurrently; one failing
//! collection or market never hides the others.

use std::sync::Arc;

use alloy::primitives::U256;
use futures_util::future::join_all;
use tracing::warn;

use crate::domain::balance::DisplayBalance;
use crate::domain::market::{EARN_MARKETS, EarnMarket, NFT_COLLECTIONS, NftCollection};
use crate::ports::chain_client::ChainClient;

use super::balance_reconciler::BalanceReconciler;

/// Tokens held in one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftHolding {
  pub name: &'static str,
  pub image_url: &'static str,
  pub amount: U256,
}

/// Supplied balance in one earn market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnPosition {
  pub market: &'static EarnMarket,
  pub supplied: DisplayBalance,
}

pub struct Portfolio<C: ChainClient> {
  chain: Arc<C>,
  reconciler: BalanceReconciler<C>,
}

impl<C: ChainClient> Portfolio<C> {
  pub fn new(chain: Arc<C>) -> Self {
    let reconciler = BalanceReconciler::new(Arc::clone(&chain));
    Self { chain, reconciler }
  }

  /// Collections where the account holds at least one token.
  pub async fn nft_holdings(&self) -> Vec<NftHolding> {
    self.holdings_in(NFT_COLLECTIONS).await
  }

  pub async fn holdings_in(&self, collections: &'static [NftCollection]) -> Vec<NftHolding> {
    let Some(owner) = self.chain.account() else {
      return Vec::new();
    };

    let reads = collections.iter().map(|c| async move {
      match self.chain.balance_of(c.address, owner).await {
        Ok(amount) if !amount.is_zero() => Some(NftHolding {
          name: c.name,
          image_url: c.image_url,
          amount,
        }),
        Ok(_) => None,
        Err(e) => {
          warn!(collection = c.name, error = %e, "Error fetching NFT balance");
          None
        }
      }
    });

    join_all(reads).await.into_iter().flatten().collect()
  }

  /// Supplied balance in every earn market.
  ///
  /// Reads only the position token; a failed read shows `"Error"` for
  /// that market alone. Empty when disconnected.
  pub async fn earn_positions(&self) -> Vec<EarnPosition> {
    let Some(owner) = self.chain.account() else {
      return Vec::new();
    };

    let reads = EARN_MARKETS.iter().map(|m| async move {
      let supplied = match self.reconciler.position(m, owner).await {
        Ok(p) => p.display,
        Err(e) => {
          warn!(market = m.name, protocol = %m.protocol, error = %e, "Failed to fetch balance");
          DisplayBalance::Error
        }
      };
      EarnPosition {
        market: m,
        supplied,
      }
    });

    join_all(reads).await
  }
}
