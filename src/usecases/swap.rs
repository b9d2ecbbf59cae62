//! Swap Use Case - Single-pool Exact-input Swaps via the Nuri Router
//!
//! Approves the router for the input token (unlimited, only when the
//! current allowance is short) and then calls `exactInputSingle` with
//! fixed pool parameters.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::primitives::utils::format_units;
use anyhow::Context;
use tracing::{instrument, warn};

use crate::domain::market::{SWAP_ROUTER, SwapToken};
use crate::domain::transaction::{ActionCall, SwapParams};
use crate::domain::units::{parse_decimal, to_units};
use crate::ports::chain_client::ChainClient;

use super::submission::{ApprovalRequest, SubmitError, SubmitOutcome, TxSubmitter};

/// Pool fee tier (0.3%).
pub const SWAP_FEE_TIER: u32 = 3000;

/// Fixed far-future deadline accepted by the router.
pub const SWAP_DEADLINE: u64 = 3_000_000_000;

/// Minimum output; effectively no slippage protection.
pub const SWAP_MIN_OUT: u64 = 1;

pub struct Swapper<C: ChainClient> {
  chain: Arc<C>,
  submitter: Arc<TxSubmitter<C>>,
}

impl<C: ChainClient> Swapper<C> {
  pub fn new(chain: Arc<C>, submitter: Arc<TxSubmitter<C>>) -> Self {
    Self { chain, submitter }
  }

  /// Full-precision wallet balance of `token`; `"0"` on read failure.
  pub async fn input_balance(&self, token: &SwapToken) -> String {
    let Some(owner) = self.chain.account() else {
      return "0".to_string();
    };

    let read = self
      .chain
      .balance_of(token.address, owner)
      .await
      .and_then(|raw| format_units(raw, token.decimals).context("format units"));

    match read {
      Ok(s) => s,
      Err(e) => {
        warn!(token = token.symbol, error = %e, "Failed to fetch balance");
        "0".to_string()
      }
    }
  }

  /// Router parameters for swapping `amount_in` units.
  pub fn params(
    token_in: &SwapToken,
    token_out: &SwapToken,
    recipient: Address,
    amount_in: U256,
  ) -> SwapParams {
    SwapParams {
      token_in: token_in.address,
      token_out: token_out.address,
      fee: SWAP_FEE_TIER,
      recipient,
      deadline: U256::from(SWAP_DEADLINE),
      amount_in,
      amount_out_minimum: U256::from(SWAP_MIN_OUT),
      sqrt_price_limit_x96: U256::ZERO,
    }
  }

  /// Swap `amount` of `token_in` for `token_out`.
  #[instrument(skip(self, token_in, token_out), fields(token_in = token_in.symbol, token_out = token_out.symbol))]
  pub async fn swap(
    &self,
    token_in: &SwapToken,
    token_out: &SwapToken,
    amount: &str,
  ) -> Result<SubmitOutcome, SubmitError> {
    let owner = self.submitter.owner()?;
    if token_in.address == token_out.address {
      return Err(SubmitError::SameToken);
    }

    let value = parse_decimal(amount)?;
    if value.is_zero() {
      return Ok(SubmitOutcome::Skipped);
    }
    let amount_in = to_units(value, token_in.decimals)?;

    let call = ActionCall::ExactInputSingle {
      router: SWAP_ROUTER,
      params: Self::params(token_in, token_out, owner, amount_in),
    };
    let approval = ApprovalRequest::unlimited(token_in.address, SWAP_ROUTER, amount_in);

    self
      .submitter
      .submit(
        &format!("Swapping {} for {}", token_in.symbol, token_out.symbol),
        Some(approval),
        call,
      )
      .await
  }
}
