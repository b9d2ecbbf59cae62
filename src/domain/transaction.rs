//! Transaction types shared by the use cases and the chain port.
//!
//! `ActionCall` is the closed set of state-changing contract calls the
//! client can make. The chain adapter turns each variant into ABI-encoded
//! calldata; use cases only ever build values of this enum.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::prediction::BetSide;

/// Parameters for a single-pool exact-input swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    /// Pool fee tier in hundredths of a bip (3000 = 0.3%).
    pub fee: u32,
    pub recipient: Address,
    /// Unix timestamp after which the router rejects the swap.
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

/// A protocol-specific state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCall {
    /// `mint(uint256)` on a rate-quoting share token.
    Mint { market: Address, amount: U256 },
    /// `redeem(uint256)` on a rate-quoting share token.
    Redeem { market: Address, shares: U256 },
    /// `deposit(asset, amount, onBehalfOf, 0)` on a Lore-style pool.
    Deposit {
        pool: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
    },
    /// `supply(asset, amount, onBehalfOf, 0)` on an Aave-style pool.
    Supply {
        pool: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
    },
    /// `withdraw(asset, amount, to)` on a Lore/Aave-style pool.
    Withdraw {
        pool: Address,
        asset: Address,
        amount: U256,
        to: Address,
    },
    /// `safeMint(to)` on an NFT collection.
    SafeMint { collection: Address, to: Address },
    /// `exactInputSingle(params)` on the swap router.
    ExactInputSingle { router: Address, params: SwapParams },
    /// `betTrue()` / `betFalse()` with the stake as `msg.value`.
    Bet {
        market: Address,
        side: BetSide,
        stake: U256,
    },
}

impl ActionCall {
    /// Contract the call is sent to.
    pub const fn target(&self) -> Address {
        match self {
            Self::Mint { market, .. } | Self::Redeem { market, .. } | Self::Bet { market, .. } => {
                *market
            }
            Self::Deposit { pool, .. } | Self::Supply { pool, .. } | Self::Withdraw { pool, .. } => {
                *pool
            }
            Self::SafeMint { collection, .. } => *collection,
            Self::ExactInputSingle { router, .. } => *router,
        }
    }

    /// Contract function name, used as a metrics/log label.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Redeem { .. } => "redeem",
            Self::Deposit { .. } => "deposit",
            Self::Supply { .. } => "supply",
            Self::Withdraw { .. } => "withdraw",
            Self::SafeMint { .. } => "safeMint",
            Self::ExactInputSingle { .. } => "exactInputSingle",
            Self::Bet {
                side: BetSide::True,
                ..
            } => "betTrue",
            Self::Bet {
                side: BetSide::False,
                ..
            } => "betFalse",
        }
    }

    /// Native value attached to the transaction.
    pub fn value(&self) -> U256 {
        match self {
            Self::Bet { stake, .. } => *stake,
            _ => U256::ZERO,
        }
    }
}

/// Mined transaction result.
///
/// `success` mirrors the receipt status (1 = success, 0 = reverted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// 0x-prefixed transaction hash.
    pub tx_hash: String,
    /// Receipt status.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_call_carries_stake_as_value() {
        let call = ActionCall::Bet {
            market: Address::repeat_byte(0x11),
            side: BetSide::False,
            stake: U256::from(4_000u64),
        };
        assert_eq!(call.method(), "betFalse");
        assert_eq!(call.value(), U256::from(4_000u64));
        assert_eq!(call.target(), Address::repeat_byte(0x11));
    }

    #[test]
    fn test_non_payable_calls_have_zero_value() {
        let call = ActionCall::Mint {
            market: Address::ZERO,
            amount: U256::from(1u8),
        };
        assert_eq!(call.value(), U256::ZERO);
        assert_eq!(call.method(), "mint");
    }
}
