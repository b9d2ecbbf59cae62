//! Prediction Use Case - Odds and Fixed-stake Bets
//!
//! Reads the pot split of a binary market and places bets of the
//! fixed stake on either side. Bets on settled markets are refused
//! before anything is sent. After a confirmed bet the totals are
//! re-read so the displayed odds include it.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use futures_util::future::join_all;
use tracing::{info, instrument, warn};

use crate::domain::market::{PREDICTION_FACTORY, PREDICTION_MARKETS};
use crate::domain::points::ActionKind;
use crate::domain::prediction::{BET_STAKE_WEI, BetSide, BetTotals};
use crate::domain::transaction::ActionCall;
use crate::ports::chain_client::ChainClient;

use super::points::PointsTracker;
use super::submission::{SubmitError, SubmitOutcome, TxSubmitter};

/// A market as listed on the prediction page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketListing {
  pub address: Address,
  pub description: String,
}

/// Outcome of a bet and, if confirmed, the refreshed totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetResult {
  pub outcome: SubmitOutcome,
  pub totals: Option<BetTotals>,
}

pub struct PredictionDesk<C: ChainClient> {
  chain: Arc<C>,
  submitter: Arc<TxSubmitter<C>>,
  points: Option<PointsTracker>,
}

impl<C: ChainClient> PredictionDesk<C> {
  pub fn new(chain: Arc<C>, submitter: Arc<TxSubmitter<C>>) -> Self {
    Self {
      chain,
      submitter,
      points: None,
    }
  }

  #[must_use]
  pub fn with_points(mut self, points: PointsTracker) -> Self {
    self.points = Some(points);
    self
  }

  /// Current pot split of `market`.
  pub async fn odds(&self, market: Address) -> Result<BetTotals> {
    self
      .chain
      .bet_totals(market)
      .await
      .with_context(|| format!("Failed to fetch bet totals for {market}"))
  }

  /// The connected account's stakes on each side.
  pub async fn my_stakes(&self, market: Address) -> Result<BetTotals, SubmitError> {
    let owner = self.submitter.owner()?;
    Ok(self.chain.account_stakes(market, owner).await?)
  }

  /// Markets from the factory with their descriptions.
  ///
  /// Falls back to the compiled-in list when the factory read fails.
  pub async fn markets(&self) -> Vec<MarketListing> {
    let addresses = match self.chain.list_markets(PREDICTION_FACTORY).await {
      Ok(a) => a,
      Err(e) => {
        warn!(error = %e, "Factory read failed, using known markets");
        return PREDICTION_MARKETS
          .iter()
          .map(|m| MarketListing {
            address: m.address,
            description: m.description.to_string(),
          })
          .collect();
      }
    };

    join_all(addresses.into_iter().map(|a| self.listing(a))).await
  }

  /// One market with its on-chain description, falling back to the
  /// known text when the read fails.
  pub async fn listing(&self, address: Address) -> MarketListing {
    let description = match self.chain.market_description(address).await {
      Ok(d) => d,
      Err(e) => {
        warn!(market = %address, error = %e, "Failed to fetch market description");
        known_description(address).unwrap_or_default()
      }
    };
    MarketListing {
      address,
      description,
    }
  }

  /// Place a fixed-stake bet on `side`.
  #[instrument(skip(self), fields(market = %market, side = %side))]
  pub async fn bet(&self, market: Address, side: BetSide) -> Result<BetResult, SubmitError> {
    let owner = self.submitter.owner()?;

    let state = self.chain.market_state(market).await?;
    if !state.accepts_bets() {
      return Err(SubmitError::MarketSettled);
    }

    let call = ActionCall::Bet {
      market,
      side,
      stake: U256::from(BET_STAKE_WEI),
    };

    let outcome = self
      .submitter
      .submit(&format!("Placing {side} bet"), None, call)
      .await?;

    if !outcome.is_confirmed() {
      return Ok(BetResult {
        outcome,
        totals: None,
      });
    }

    if let Some(points) = &self.points {
      points.record(owner, ActionKind::PredictionBet).await;
    }

    let totals = match self.chain.bet_totals(market).await {
      Ok(t) => {
        info!(yes = %t.true_percentage(), no = %t.false_percentage(), "Odds refreshed");
        Some(t)
      }
      Err(e) => {
        warn!(error = %e, "Failed to refresh bet totals");
        None
      }
    };

    Ok(BetResult { outcome, totals })
  }
}

fn known_description(address: Address) -> Option<String> {
  PREDICTION_MARKETS
    .iter()
    .find(|m| m.address == address)
    .map(|m| m.description.to_string())
}
