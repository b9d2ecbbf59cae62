//! Transaction Submission Use Case - Approve-then-Act
//!
//! Every write in the client goes through `TxSubmitter::submit`:
//! 1. Read `allowance(owner, spender)` if the action spends an ERC-20
//! 2. If short, submit `approve` and wait for its receipt
//! 3. Submit the action call and wait for its receipt
//! 4. Report success (receipt status 1) or reversion to the notifier
//!
//! The approval is always confirmed before the action is sent. There
//! is no retry: any failure aborts the operation and is surfaced once.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::domain::transaction::{ActionCall, TxReceipt};
use crate::domain::units::AmountError;
use crate::ports::chain_client::ChainClient;
use crate::ports::notifier::{Notification, Notifier};

/// Why a submission did not go through.
#[derive(Debug, Error)]
pub enum SubmitError {
  /// No wallet session; raised before any network call.
  #[error("user is disconnected")]
  Disconnected,
  /// The same card already has this operation in flight.
  #[error("{0} already in progress")]
  Busy(&'static str),
  #[error(transparent)]
  InvalidAmount(#[from] AmountError),
  /// The balance needed to size the request could not be read.
  #[error("balance unavailable")]
  BalanceUnavailable,
  #[error("input and output token must differ")]
  SameToken,
  #[error("market is settled")]
  MarketSettled,
  /// The approve transaction mined with status 0.
  #[error("approval reverted: {tx_hash}")]
  ApprovalReverted { tx_hash: String },
  /// Network, signing or revert error from the chain client.
  #[error(transparent)]
  Chain(#[from] anyhow::Error),
}

/// ERC-20 spend that must be authorized before the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
  pub token: Address,
  pub spender: Address,
  /// Minimum allowance the action needs.
  pub required: U256,
  /// Amount to approve when the allowance is short.
  pub approve_amount: U256,
}

impl ApprovalRequest {
  /// Approve exactly what the action spends.
  pub const fn exact(token: Address, spender: Address, amount: U256) -> Self {
    Self {
      token,
      spender,
      required: amount,
      approve_amount: amount,
    }
  }

  /// Approve the maximum so later actions skip the approval.
  pub const fn unlimited(token: Address, spender: Address, amount: U256) -> Self {
    Self {
      token,
      spender,
      required: amount,
      approve_amount: U256::MAX,
    }
  }
}

/// Result of a submission that reached the chain (or was a no-op).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
  /// Nothing to do (zero amount).
  Skipped,
  /// Action mined with status 1.
  Confirmed { tx_hash: String },
  /// Action mined with status 0.
  Reverted { tx_hash: String },
}

impl SubmitOutcome {
  pub const fn is_confirmed(&self) -> bool {
    matches!(self, Self::Confirmed { .. })
  }

  pub fn tx_hash(&self) -> Option<&str> {
    match self {
      Self::Confirmed { tx_hash } | Self::Reverted { tx_hash } => Some(tx_hash),
      Self::Skipped => None,
    }
  }
}

/// Runs the approve-then-act sequence and reports progress.
pub struct TxSubmitter<C: ChainClient> {
  chain: Arc<C>,
  notifier: Arc<dyn Notifier>,
}

impl<C: ChainClient> TxSubmitter<C> {
  pub fn new(chain: Arc<C>, notifier: Arc<dyn Notifier>) -> Self {
    Self { chain, notifier }
  }

  /// Session account, or `Disconnected`.
  pub fn owner(&self) -> Result<Address, SubmitError> {
    self.chain.account().ok_or(SubmitError::Disconnected)
  }

  /// Submit `call`, approving first when `approval` is given and the
  /// current allowance is below `approval.required`.
  #[instrument(skip(self, approval, call), fields(label = %label, method = call.method()))]
  pub async fn submit(
    &self,
    label: &str,
    approval: Option<ApprovalRequest>,
    call: ActionCall,
  ) -> Result<SubmitOutcome, SubmitError> {
    let owner = self.owner()?;

    self.notifier.notify(&Notification::Pending {
      label: label.to_string(),
    });

    match self.run(owner, approval, &call).await {
      Ok(receipt) if receipt.success => {
        info!(tx_hash = %receipt.tx_hash, "Transaction confirmed");
        self.notifier.notify(&Notification::Success {
          label: label.to_string(),
          tx_hash: receipt.tx_hash.clone(),
        });
        Ok(SubmitOutcome::Confirmed {
          tx_hash: receipt.tx_hash,
        })
      }
      Ok(receipt) => {
        warn!(tx_hash = %receipt.tx_hash, "Transaction reverted");
        self.notifier.notify(&Notification::Failure {
          label: label.to_string(),
          reason: format!("transaction {} reverted", receipt.tx_hash),
        });
        Ok(SubmitOutcome::Reverted {
          tx_hash: receipt.tx_hash,
        })
      }
      Err(e) => {
        error!(error = %e, "Transaction failed");
        self.notifier.notify(&Notification::Failure {
          label: label.to_string(),
          reason: e.to_string(),
        });
        Err(e)
      }
    }
  }

  async fn run(
    &self,
    owner: Address,
    approval: Option<ApprovalRequest>,
    call: &ActionCall,
  ) -> Result<TxReceipt, SubmitError> {
    if let Some(req) = approval {
      self.ensure_allowance(owner, &req).await?;
    }

    let receipt = self.chain.send_action(call).await?;
    Ok(receipt)
  }

  /// Check allowance and submit approval if below the requirement.
  ///
  /// Returns `true` if an approval transaction was mined.
  async fn ensure_allowance(
    &self,
    owner: Address,
    req: &ApprovalRequest,
  ) -> Result<bool, SubmitError> {
    let current = self
      .chain
      .allowance(req.token, owner, req.spender)
      .await?;

    if current >= req.required {
      return Ok(false);
    }

    info!(
      current = %current,
      required = %req.required,
      spender = %req.spender,
      "Submitting approval"
    );

    let receipt = self
      .chain
      .approve(req.token, req.spender, req.approve_amount)
      .await?;

    if !receipt.success {
      return Err(SubmitError::ApprovalReverted {
        tx_hash: receipt.tx_hash,
      });
    }

    Ok(true)
  }
}
