//! Token unit conversions.
//!
//! On-chain amounts are integers in the token's smallest unit. Users
//! type decimal strings. This module converts between the two:
//! - `parse_units`: decimal string → integer, floor truncation
//! - `format_units_2dp`: integer → display string rounded to 2 places
//!
//! All arithmetic is exact (Decimal for input, U256 for output).

use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use thiserror::Error;

/// Decimals used by USDC and USDT on Scroll.
pub const STABLECOIN_DECIMALS: u8 = 6;

/// Decimals used by ETH, WETH and SCROLL.
pub const ETHER_DECIMALS: u8 = 18;

/// Errors produced while interpreting a user-entered amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Input is not a plain decimal number.
    #[error("malformed amount: {0:?}")]
    Malformed(String),
    /// Input is below zero.
    #[error("amount must not be negative")]
    Negative,
    /// Input does not fit the integer range after scaling.
    #[error("amount too large for {decimals} decimals")]
    Overflow {
        /// Token decimals used for scaling.
        decimals: u8,
    },
    /// Requested amount is larger than what the account holds.
    #[error("requested {requested} exceeds available {available}")]
    ExceedsBalance {
        /// Requested decimal amount.
        requested: Decimal,
        /// Displayed balance at the time of the request.
        available: Decimal,
    },
    /// There is nothing to withdraw from.
    #[error("balance is zero")]
    ZeroBalance,
}

/// Parse a user-entered decimal amount.
pub fn parse_decimal(amount: &str) -> Result<Decimal, AmountError> {
    let trimmed = amount.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|_| AmountError::Malformed(trimmed.to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative);
    }
    Ok(value)
}

/// Convert a decimal amount into integer token units.
///
/// Computes `floor(amount * 10^decimals)`; any precision beyond the
/// token's decimals is dropped, never rounded up.
pub fn to_units(amount: Decimal, decimals: u8) -> Result<U256, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative);
    }
    let factor = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(AmountError::Overflow { decimals })?;
    let scaled = amount
        .checked_mul(Decimal::from(factor))
        .ok_or(AmountError::Overflow { decimals })?
        .floor();
    let units = scaled.to_u128().ok_or(AmountError::Overflow { decimals })?;
    Ok(U256::from(units))
}

/// Parse a decimal string straight into integer token units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    to_units(parse_decimal(amount)?, decimals)
}

/// Amount for a percentage of `max`, rounded to two places.
///
/// Mirrors the amount slider: 100% yields exactly the displayed figure.
pub fn percent_of(max: Decimal, percent: Decimal) -> Decimal {
    (max * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Interpret user input that is either a decimal or a percentage
/// (`"25%"`) of `max`.
pub fn resolve_input(input: &str, max: Option<Decimal>) -> Result<Decimal, AmountError> {
    let trimmed = input.trim();
    match trimmed.strip_suffix('%') {
        Some(pct) => {
            let pct = parse_decimal(pct)?;
            if pct > Decimal::ONE_HUNDRED {
                return Err(AmountError::Malformed(trimmed.to_string()));
            }
            let max = max.ok_or(AmountError::ZeroBalance)?;
            Ok(percent_of(max, pct))
        }
        None => parse_decimal(trimmed),
    }
}

/// `10^decimals` as a U256; `None` past 77 decimals.
pub fn unit_scale(decimals: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(decimals))
}

/// Format integer token units as a decimal string with two places.
///
/// Rounds half away from zero, so `1_235_000` at 6 decimals is `"1.24"`.
/// Returns `None` when the rounding arithmetic would overflow.
pub fn format_units_2dp(raw: U256, decimals: u8) -> Option<String> {
    let scale = unit_scale(decimals)?;
    let half = scale / U256::from(2u8);
    let hundredths = raw.checked_mul(U256::from(100u8))?.checked_add(half)? / scale;
    let whole = hundredths / U256::from(100u8);
    let frac = hundredths % U256::from(100u8);
    Some(format!("{whole}.{:02}", frac.to::<u64>()))
}
