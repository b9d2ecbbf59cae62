//! Earn Card Use Case - Deposit and Withdraw on a Lending Market
//!
//! One `EarnCard` per market. It holds the last reconciled balances,
//! sizes deposits and withdrawals from them, and runs each through
//! the approve-then-act submitter. After a confirmed transaction the
//! balances are re-read from chain; nothing is mutated optimistically.
//!
//! `is_depositing` / `is_withdrawing` are set for the duration of an
//! operation and cleared on every exit path. A second call while one
//! is in flight on the same card is rejected as `Busy`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::U256;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::domain::balance::DisplayBalance;
use crate::domain::market::{BalanceSource, EarnMarket};
use crate::domain::points::ActionKind;
use crate::domain::units::{resolve_input, to_units};
use crate::domain::withdrawal::{redeem_shares, withdraw_units};
use crate::ports::chain_client::ChainClient;

use super::balance_reconciler::BalanceReconciler;
use super::points::PointsTracker;
use super::submission::{ApprovalRequest, SubmitError, SubmitOutcome, TxSubmitter};

/// Last reconciled balances of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarnCardState {
  /// Supplied balance in the underlying asset.
  pub supplied: DisplayBalance,
  /// Underlying asset held in the wallet.
  pub wallet: DisplayBalance,
  /// Raw position token balance (shares or aToken units).
  pub stored: U256,
  /// Raw underlying units in the wallet.
  pub wallet_units: U256,
}

/// Holds a busy flag for the lifetime of the guard.
struct BusyGuard<'a> {
  flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
  fn acquire(flag: &'a AtomicBool, what: &'static str) -> Result<Self, SubmitError> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .map_err(|_| SubmitError::Busy(what))?;
    Ok(Self { flag })
  }
}

impl Drop for BusyGuard<'_> {
  fn drop(&mut self) {
    self.flag.store(false, Ordering::Release);
  }
}

/// Deposit/withdraw controller for one earn market.
pub struct EarnCard<C: ChainClient> {
  market: &'static EarnMarket,
  reconciler: BalanceReconciler<C>,
  submitter: Arc<TxSubmitter<C>>,
  points: Option<PointsTracker>,
  state: RwLock<EarnCardState>,
  depositing: AtomicBool,
  withdrawing: AtomicBool,
}

impl<C: ChainClient> EarnCard<C> {
  pub fn new(
    market: &'static EarnMarket,
    reconciler: BalanceReconciler<C>,
    submitter: Arc<TxSubmitter<C>>,
  ) -> Self {
    Self {
      market,
      reconciler,
      submitter,
      points: None,
      state: RwLock::new(EarnCardState::default()),
      depositing: AtomicBool::new(false),
      withdrawing: AtomicBool::new(false),
    }
  }

  /// Log confirmed deposits to the points tracker.
  #[must_use]
  pub fn with_points(mut self, points: PointsTracker) -> Self {
    self.points = Some(points);
    self
  }

  pub const fn market(&self) -> &'static EarnMarket {
    self.market
  }

  pub fn is_depositing(&self) -> bool {
    self.depositing.load(Ordering::Acquire)
  }

  pub fn is_withdrawing(&self) -> bool {
    self.withdrawing.load(Ordering::Acquire)
  }

  /// Copy of the last reconciled balances.
  pub async fn snapshot(&self) -> EarnCardState {
    self.state.read().await.clone()
  }

  /// Re-read both balances from chain.
  ///
  /// A failed position read shows `"Error"` but keeps the last stored
  /// amount. Does nothing when disconnected.
  pub async fn refresh(&self) -> EarnCardState {
    if let Some(balances) = self.reconciler.reconcile(self.market).await {
      let mut state = self.state.write().await;
      state.supplied = balances.supplied();
      state.wallet = balances.wallet;
      if let Some(units) = balances.wallet_units {
        state.wallet_units = units;
      }
      if let Some(position) = balances.position {
        state.stored = position.stored;
      }
    }
    self.snapshot().await
  }

  /// Deposit `amount` of the underlying asset (decimal or `"N%"` of
  /// the wallet balance). The full displayed balance deposits the exact
  /// raw wallet units.
  #[instrument(skip(self), fields(market = self.market.name, protocol = %self.market.protocol))]
  pub async fn deposit(&self, amount: &str) -> Result<SubmitOutcome, SubmitError> {
    let owner = self.submitter.owner()?;
    let (wallet, wallet_units) = {
      let state = self.state.read().await;
      (state.wallet.as_decimal(), state.wallet_units)
    };
    let value = resolve_input(amount, wallet)?;
    if value.is_zero() {
      return Ok(SubmitOutcome::Skipped);
    }

    let _busy = BusyGuard::acquire(&self.depositing, "deposit")?;

    // The displayed figure is rounded; depositing all of it sends the
    // raw wallet units so rounding up can never overspend.
    let units = if wallet == Some(value) {
      wallet_units
    } else {
      to_units(value, self.market.decimals)?
    };
    let call = self.market.protocol.deposit_call(self.market, owner, units);
    let approval = ApprovalRequest::exact(self.market.token, self.market.address, units);

    let outcome = self
      .submitter
      .submit(&format!("Depositing {}", self.market.asset), Some(approval), call)
      .await?;

    if outcome.is_confirmed() {
      info!(amount = %value, asset = self.market.asset, "Deposit confirmed");
      self.refresh().await;
      if let Some(points) = &self.points {
        points.record(owner, ActionKind::EarnPosition).await;
      }
    }

    Ok(outcome)
  }

  /// Withdraw `amount` of the underlying asset (decimal or `"N%"` of
  /// the supplied balance).
  #[instrument(skip(self), fields(market = self.market.name, protocol = %self.market.protocol))]
  pub async fn withdraw(&self, amount: &str) -> Result<SubmitOutcome, SubmitError> {
    let owner = self.submitter.owner()?;
    let (displayed, stored) = {
      let state = self.state.read().await;
      (state.supplied.as_decimal(), state.stored)
    };
    let requested = resolve_input(amount, displayed)?;
    if requested.is_zero() {
      return Ok(SubmitOutcome::Skipped);
    }

    let _busy = BusyGuard::acquire(&self.withdrawing, "withdraw")?;

    let displayed = displayed.ok_or(SubmitError::BalanceUnavailable)?;
    let units = match self.market.protocol.balance_source() {
      BalanceSource::ExchangeRate => redeem_shares(requested, displayed, stored)?,
      BalanceSource::AToken => withdraw_units(requested, displayed, stored, self.market.decimals)?,
    };
    let call = self.market.protocol.withdraw_call(self.market, owner, units);

    let outcome = self
      .submitter
      .submit(&format!("Withdrawing {}", self.market.asset), None, call)
      .await?;

    if outcome.is_confirmed() {
      info!(amount = %requested, units = %units, asset = self.market.asset, "Withdrawal confirmed");
      self.refresh().await;
    }

    Ok(outcome)
  }

  /// Seed the card state directly, bypassing a chain read.
  pub async fn set_state(&self, state: EarnCardState) {
    *self.state.write().await = state;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_busy_guard_resets_on_drop() {
    let flag = AtomicBool::new(false);
    {
      let _g = BusyGuard::acquire(&flag, "deposit").unwrap();
      assert!(flag.load(Ordering::Acquire));
      assert!(matches!(
        BusyGuard::acquire(&flag, "deposit"),
        Err(SubmitError::Busy("deposit"))
      ));
    }
    assert!(!flag.load(Ordering::Acquire));
  }
}
