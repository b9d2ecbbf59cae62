//! Dry-run Chain Client
//!
//! Wraps a real `ChainClient`: reads pass through, writes are logged
//! with their target and method and then refused, so nothing reaches
//! the mempool.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::warn;

use crate::domain::prediction::{BetTotals, MarketState};
use crate::domain::transaction::{ActionCall, TxReceipt};
use crate::ports::chain_client::ChainClient;

pub struct DryRunChainClient<C: ChainClient> {
    inner: Arc<C>,
}

impl<C: ChainClient> DryRunChainClient<C> {
    pub fn new(inner: Arc<C>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ChainClient> ChainClient for DryRunChainClient<C> {
    fn account(&self) -> Option<Address> {
        self.inner.account()
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.inner.balance_of(token, owner).await
    }

    async fn exchange_rate_stored(&self, market: Address) -> Result<U256> {
        self.inner.exchange_rate_stored(market).await
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.inner.allowance(token, owner, spender).await
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxReceipt> {
        warn!(token = %token, spender = %spender, amount = %amount, "Dry-run: approve not sent");
        bail!("dry run: approve not sent")
    }

    async fn send_action(&self, call: &ActionCall) -> Result<TxReceipt> {
        warn!(
            to = %call.target(),
            method = call.method(),
            value = %call.value(),
            call = ?call,
            "Dry-run: transaction not sent"
        );
        bail!("dry run: {} not sent", call.method())
    }

    async fn bet_totals(&self, market: Address) -> Result<BetTotals> {
        self.inner.bet_totals(market).await
    }

    async fn account_stakes(&self, market: Address, owner: Address) -> Result<BetTotals> {
        self.inner.account_stakes(market, owner).await
    }

    async fn market_state(&self, market: Address) -> Result<MarketState> {
        self.inner.market_state(market).await
    }

    async fn market_description(&self, market: Address) -> Result<String> {
        self.inner.market_description(market).await
    }

    async fn list_markets(&self, factory: Address) -> Result<Vec<Address>> {
        self.inner.list_markets(factory).await
    }

    async fn is_healthy(&self) -> bool {
        self.inner.is_healthy().await
    }
}
