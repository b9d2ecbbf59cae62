//! Chain Client Port - On-chain Interaction Interface
//!
//! Defines the trait for reading balances and market state from
//! Scroll and for submitting transactions. Every write waits for its
//! receipt before returning. Implemented over alloy-rs in
//! `adapters::chain`.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::domain::prediction::{BetTotals, MarketState};
use crate::domain::transaction::{ActionCall, TxReceipt};

/// Trait for on-chain interactions.
///
/// Reads are independent and safe to run concurrently. Writes are
/// signed by the session account; a watch-only session fails them.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
  /// Account of the current wallet session, `None` when disconnected.
  fn account(&self) -> Option<Address>;

  /// ERC-20 / ERC-721 `balanceOf(owner)` on `token`.
  async fn balance_of(&self, token: Address, owner: Address) -> anyhow::Result<U256>;

  /// `exchangeRateStored()` of a rate-quoting share token (1e18 scale).
  async fn exchange_rate_stored(&self, market: Address) -> anyhow::Result<U256>;

  /// ERC-20 `allowance(owner, spender)`.
  async fn allowance(
    &self,
    token: Address,
    owner: Address,
    spender: Address,
  ) -> anyhow::Result<U256>;

  /// Submit ERC-20 `approve(spender, amount)` and wait for the receipt.
  async fn approve(
    &self,
    token: Address,
    spender: Address,
    amount: U256,
  ) -> anyhow::Result<TxReceipt>;

  /// Submit a protocol action and wait for the receipt.
  async fn send_action(&self, call: &ActionCall) -> anyhow::Result<TxReceipt>;

  /// `totalTrueBets()` / `totalFalseBets()` of a prediction market.
  async fn bet_totals(&self, market: Address) -> anyhow::Result<BetTotals>;

  /// `trueBets(owner)` / `falseBets(owner)` of a prediction market.
  async fn account_stakes(&self, market: Address, owner: Address) -> anyhow::Result<BetTotals>;

  /// `isSettled()` and, when settled, `marketOutcome()`.
  async fn market_state(&self, market: Address) -> anyhow::Result<MarketState>;

  /// `description()` of a prediction market.
  async fn market_description(&self, market: Address) -> anyhow::Result<String>;

  /// `getMarkets()` of the prediction factory.
  async fn list_markets(&self, factory: Address) -> anyhow::Result<Vec<Address>>;

  /// Check if the RPC connection is healthy.
  async fn is_healthy(&self) -> bool;
}
