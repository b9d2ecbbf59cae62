//! Balance derivation for earn positions.
//!
//! Rate-quoting markets report shares; the underlying amount is
//! `shares * exchangeRate / 1e18`. aToken markets report underlying
//! units directly. Either way the result is formatted with the asset's
//! decimals and rounded to two places for display.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::units::{format_units_2dp, parse_decimal};

/// Fixed-point scale of `exchangeRateStored()`.
pub const EXCHANGE_RATE_SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Convert a share balance into underlying units.
///
/// Returns `None` on overflow of the intermediate product.
pub fn underlying_from_shares(shares: U256, exchange_rate: U256) -> Option<U256> {
    shares
        .checked_mul(exchange_rate)
        .map(|product| product / EXCHANGE_RATE_SCALE)
}

/// A balance as shown to the user.
///
/// Read failures degrade to `Error`, displayed as the literal `"Error"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayBalance {
    Amount(String),
    Error,
}

impl DisplayBalance {
    /// Format raw units with the given decimals; `Error` on overflow.
    pub fn from_units(raw: U256, decimals: u8) -> Self {
        format_units_2dp(raw, decimals).map_or(Self::Error, Self::Amount)
    }

    /// Parsed numeric value, `None` for the error sentinel.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Amount(s) => parse_decimal(s).ok(),
            Self::Error => None,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl Default for DisplayBalance {
    fn default() -> Self {
        Self::Amount("0.00".to_string())
    }
}

impl std::fmt::Display for DisplayBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount(s) => f.write_str(s),
            Self::Error => f.write_str("Error"),
        }
    }
}

/// A reconciled position: what is stored on-chain and what is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionBalance {
    /// Raw `balanceOf` of the position token (shares or aToken units).
    pub stored: U256,
    /// Underlying amount in the asset's smallest unit.
    pub underlying: U256,
    /// Underlying amount rounded for display.
    pub display: DisplayBalance,
}

impl PositionBalance {
    /// Position in a rate-quoting market.
    pub fn from_shares(shares: U256, exchange_rate: U256, decimals: u8) -> Option<Self> {
        let underlying = underlying_from_shares(shares, exchange_rate)?;
        Some(Self {
            stored: shares,
            underlying,
            display: DisplayBalance::from_units(underlying, decimals),
        })
    }

    /// Position whose token already tracks underlying units 1:1.
    pub fn from_underlying(raw: U256, decimals: u8) -> Self {
        Self {
            stored: raw,
            underlying: raw,
            display: DisplayBalance::from_units(raw, decimals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scale_constant() {
        assert_eq!(EXCHANGE_RATE_SCALE, U256::from(10u8).pow(U256::from(18u8)));
    }

    #[test]
    fn test_rate_market_display() {
        let shares = U256::from(200_000_000u64);
        let rate = U256::from(1_050_000_000_000_000_000u128);
        let pos = PositionBalance::from_shares(shares, rate, 6).unwrap();
        assert_eq!(pos.underlying, U256::from(210_000_000u64));
        assert_eq!(pos.display.to_string(), "210.00");
        assert_eq!(pos.stored, shares);
    }

    #[test]
    fn test_rate_market_truncates_before_rounding() {
        // 3 shares at rate 0.333.. → 0 units after integer division
        let rate = U256::from(333_333_333_333_333_333u128);
        assert_eq!(underlying_from_shares(U256::from(3u8), rate), Some(U256::ZERO));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(underlying_from_shares(U256::MAX, U256::from(2u8)), None);
    }

    #[test]
    fn test_unformattable_balance_is_error() {
        assert!(DisplayBalance::from_units(U256::MAX, 6).is_error());
        let pos = PositionBalance::from_underlying(U256::MAX, 6);
        assert_eq!(pos.display.to_string(), "Error");
    }

    #[test]
    fn test_error_sentinel() {
        let e = DisplayBalance::Error;
        assert_eq!(e.to_string(), "Error");
        assert!(e.as_decimal().is_none());
        assert_eq!(
            DisplayBalance::Amount("100.00".into()).as_decimal(),
            Some(dec!(100.00))
        );
    }
}
