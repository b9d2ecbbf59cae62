//! Scroll Contract Interactions - ERC-20, Lending, Router, Prediction
//!
//! Implements the `ChainClient` port with typed `sol!` bindings.
//! Reads are ABI-encoded call structs sent as `eth_call` and decoded
//! with `abi_decode_returns`. Writes are
//! ABI-encoded from `ActionCall`, sent as a single transaction and
//! awaited until the receipt is mined.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::aliases::{U24, U160};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::domain::prediction::{BetSide, BetTotals, MarketState, Outcome};
use crate::domain::transaction::{ActionCall, SwapParams, TxReceipt};
use crate::ports::chain_client::ChainClient;

use super::provider::{ScrollProvider, Session};

sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface IRhoMarket {
        function exchangeRateStored() external view returns (uint256);
        function mint(uint256 mintAmount) external returns (uint256);
        function redeem(uint256 redeemTokens) external returns (uint256);
    }

    interface ILendingPool {
        function deposit(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function withdraw(address asset, uint256 amount, address to) external returns (uint256);
    }

    interface IMintableNft {
        function safeMint(address to) external;
    }

    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
    }

    interface IPredictionMarket {
        function description() external view returns (string memory);
        function marketOutcome() external view returns (uint8);
        function isSettled() external view returns (bool);
        function trueBets(address account) external view returns (uint256);
        function falseBets(address account) external view returns (uint256);
        function totalTrueBets() external view returns (uint256);
        function totalFalseBets() external view returns (uint256);
        function betTrue() external payable;
        function betFalse() external payable;
    }

    interface IPredictionFactory {
        function getMarkets() external view returns (address[] memory);
    }
}

/// ABI-encode the calldata of `call`.
pub fn encode_action(call: &ActionCall) -> Result<Bytes> {
    let data = match call {
        ActionCall::Mint { amount, .. } => IRhoMarket::mintCall {
            mintAmount: *amount,
        }
        .abi_encode(),
        ActionCall::Redeem { shares, .. } => IRhoMarket::redeemCall {
            redeemTokens: *shares,
        }
        .abi_encode(),
        ActionCall::Deposit {
            asset,
            amount,
            on_behalf_of,
            ..
        } => ILendingPool::depositCall {
            asset: *asset,
            amount: *amount,
            onBehalfOf: *on_behalf_of,
            referralCode: 0,
        }
        .abi_encode(),
        ActionCall::Supply {
            asset,
            amount,
            on_behalf_of,
            ..
        } => ILendingPool::supplyCall {
            asset: *asset,
            amount: *amount,
            onBehalfOf: *on_behalf_of,
            referralCode: 0,
        }
        .abi_encode(),
        ActionCall::Withdraw { asset, amount, to, .. } => ILendingPool::withdrawCall {
            asset: *asset,
            amount: *amount,
            to: *to,
        }
        .abi_encode(),
        ActionCall::SafeMint { to, .. } => IMintableNft::safeMintCall { to: *to }.abi_encode(),
        ActionCall::ExactInputSingle { params, .. } => ISwapRouter::exactInputSingleCall {
            params: router_params(params)?,
        }
        .abi_encode(),
        ActionCall::Bet {
            side: BetSide::True,
            ..
        } => IPredictionMarket::betTrueCall {}.abi_encode(),
        ActionCall::Bet {
            side: BetSide::False,
            ..
        } => IPredictionMarket::betFalseCall {}.abi_encode(),
    };

    Ok(Bytes::from(data))
}

fn router_params(p: &SwapParams) -> Result<ISwapRouter::ExactInputSingleParams> {
    Ok(ISwapRouter::ExactInputSingleParams {
        tokenIn: p.token_in,
        tokenOut: p.token_out,
        fee: U24::try_from_be_slice(&p.fee.to_be_bytes()).context("fee exceeds uint24")?,
        recipient: p.recipient,
        deadline: p.deadline,
        amountIn: p.amount_in,
        amountOutMinimum: p.amount_out_minimum,
        sqrtPriceLimitX96: U160::try_from_be_slice(&p.sqrt_price_limit_x96.to_be_bytes::<32>())
            .context("sqrtPriceLimitX96 exceeds uint160")?,
    })
}

/// `ChainClient` over a Scroll RPC provider.
pub struct ScrollChainClient {
    provider: Arc<ScrollProvider>,
}

impl ScrollChainClient {
    pub fn new(provider: Arc<ScrollProvider>) -> Self {
        Self { provider }
    }

    /// `eth_call` of `call` against `to`, decoding the return data.
    async fn read<T: SolCall + Send>(&self, to: Address, call: T) -> Result<T::Return> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        let out = self.provider.inner().call(&tx).await?;
        T::abi_decode_returns(&out, true).context("Failed to decode return data")
    }

    /// Sign, send and wait for the receipt of one transaction.
    async fn transact(&self, to: Address, data: Bytes, value: U256) -> Result<TxReceipt> {
        let from = match self.provider.session() {
            Session::Signing(a) => a,
            Session::WatchOnly(_) => bail!("Watch-only session cannot sign transactions"),
            Session::Disconnected => bail!("No wallet session"),
        };

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data)
            .with_value(value);

        let pending = self
            .provider
            .inner()
            .send_transaction(tx)
            .await
            .context("Failed to send transaction")?;
        debug!(tx_hash = %pending.tx_hash(), "Transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to get transaction receipt")?;

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash.to_string(),
            success: receipt.status(),
        })
    }
}

#[async_trait]
impl ChainClient for ScrollChainClient {
    fn account(&self) -> Option<Address> {
        self.provider.session().account()
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        let ret = self
            .read(token, IERC20::balanceOfCall { account: owner })
            .await
            .with_context(|| format!("balanceOf failed on {token}"))?;
        Ok(ret._0)
    }

    async fn exchange_rate_stored(&self, market: Address) -> Result<U256> {
        let ret = self
            .read(market, IRhoMarket::exchangeRateStoredCall {})
            .await
            .with_context(|| format!("exchangeRateStored failed on {market}"))?;
        Ok(ret._0)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let ret = self
            .read(token, IERC20::allowanceCall { owner, spender })
            .await
            .with_context(|| format!("allowance failed on {token}"))?;
        Ok(ret._0)
    }

    #[instrument(skip(self), fields(token = %token, spender = %spender))]
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxReceipt> {
        let data = IERC20::approveCall { spender, amount }.abi_encode();
        let receipt = self.transact(token, Bytes::from(data), U256::ZERO).await?;
        info!(tx_hash = %receipt.tx_hash, success = receipt.success, "Approval mined");
        Ok(receipt)
    }

    #[instrument(skip(self, call), fields(method = call.method(), to = %call.target()))]
    async fn send_action(&self, call: &ActionCall) -> Result<TxReceipt> {
        let data = encode_action(call)?;
        self.transact(call.target(), data, call.value()).await
    }

    async fn bet_totals(&self, market: Address) -> Result<BetTotals> {
        let (t, f) = tokio::try_join!(
            self.read(market, IPredictionMarket::totalTrueBetsCall {}),
            self.read(market, IPredictionMarket::totalFalseBetsCall {}),
        )
        .with_context(|| format!("Failed to read bet totals on {market}"))?;
        Ok(BetTotals::new(t._0, f._0))
    }

    async fn account_stakes(&self, market: Address, owner: Address) -> Result<BetTotals> {
        let (t, f) = tokio::try_join!(
            self.read(market, IPredictionMarket::trueBetsCall { account: owner }),
            self.read(market, IPredictionMarket::falseBetsCall { account: owner }),
        )
        .with_context(|| format!("Failed to read stakes on {market}"))?;
        Ok(BetTotals::new(t._0, f._0))
    }

    async fn market_state(&self, market: Address) -> Result<MarketState> {
        let settled = self
            .read(market, IPredictionMarket::isSettledCall {})
            .await
            .with_context(|| format!("isSettled failed on {market}"))?
            ._0;
        if !settled {
            return Ok(MarketState::Open);
        }

        let code = self
            .read(market, IPredictionMarket::marketOutcomeCall {})
            .await
            .with_context(|| format!("marketOutcome failed on {market}"))?
            ._0;
        Ok(MarketState::Settled(Outcome::from_code(code)))
    }

    async fn market_description(&self, market: Address) -> Result<String> {
        let ret = self
            .read(market, IPredictionMarket::descriptionCall {})
            .await
            .with_context(|| format!("description failed on {market}"))?;
        Ok(ret._0)
    }

    async fn list_markets(&self, factory: Address) -> Result<Vec<Address>> {
        let ret = self
            .read(factory, IPredictionFactory::getMarketsCall {})
            .await
            .context("getMarkets failed")?;
        Ok(ret._0)
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_selectors() {
        let yes = ActionCall::Bet {
            market: Address::ZERO,
            side: BetSide::True,
            stake: U256::from(1u8),
        };
        let data = encode_action(&yes).unwrap();
        assert_eq!(&data[..], &IPredictionMarket::betTrueCall::SELECTOR[..]);
    }

    #[test]
    fn test_deposit_encodes_zero_referral() {
        let call = ActionCall::Deposit {
            pool: Address::ZERO,
            asset: Address::repeat_byte(1),
            amount: U256::from(5u8),
            on_behalf_of: Address::repeat_byte(2),
        };
        let data = encode_action(&call).unwrap();
        let decoded = ILendingPool::depositCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.amount, U256::from(5u8));
        assert_eq!(decoded.referralCode, 0);
        assert_eq!(decoded.onBehalfOf, Address::repeat_byte(2));
    }

    #[test]
    fn test_read_return_decoding() {
        let word = U256::from(210_000_000u64).to_be_bytes::<32>();
        let ret = IERC20::balanceOfCall::abi_decode_returns(&word, true).unwrap();
        assert_eq!(ret._0, U256::from(210_000_000u64));

        let settled = U256::from(1u8).to_be_bytes::<32>();
        assert!(IPredictionMarket::isSettledCall::abi_decode_returns(&settled, true).unwrap()._0);

        let outcome = IPredictionMarket::marketOutcomeCall::abi_decode_returns(&[0u8; 32], true).unwrap();
        assert_eq!(Outcome::from_code(outcome._0), Outcome::False);
    }

    #[test]
    fn test_swap_params_fit_router_types() {
        let params = SwapParams {
            token_in: Address::repeat_byte(1),
            token_out: Address::repeat_byte(2),
            fee: 3000,
            recipient: Address::repeat_byte(3),
            deadline: U256::from(3_000_000_000u64),
            amount_in: U256::from(10u8),
            amount_out_minimum: U256::from(1u8),
            sqrt_price_limit_x96: U256::ZERO,
        };
        let encoded = router_params(&params).unwrap();
        assert_eq!(encoded.fee, U24::from(3000u32));
        assert_eq!(encoded.sqrtPriceLimitX96, U160::ZERO);

        let wide_fee = SwapParams {
            fee: 1 << 24,
            ..params.clone()
        };
        assert!(router_params(&wide_fee).is_err());

        let too_wide = SwapParams {
            sqrt_price_limit_x96: U256::MAX,
            ..params
        };
        assert!(router_params(&too_wide).is_err());
    }
}
