//! Withdrawal sizing.
//!
//! The user asks for an amount of the underlying asset, but the chain
//! only knows the stored position (shares or aToken units) and the UI
//! only shows a rounded figure. Sizing rules:
//!
//! - requested == displayed → withdraw the exact stored position
//! - requested <  displayed → stored * requested / displayed, floored
//! - requested >  displayed → rejected
//!
//! The proportional branch can leave dust; that is accepted.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use super::units::{AmountError, to_units};

/// Share units to redeem from a rate-quoting market.
pub fn redeem_shares(
    requested: Decimal,
    displayed: Decimal,
    stored_shares: U256,
) -> Result<U256, AmountError> {
    check_requested(requested, displayed)?;

    if requested == displayed {
        return Ok(stored_shares);
    }

    // Exact rational: align both decimals to a common scale and use
    // their mantissas as numerator/denominator.
    let scale = requested.scale().max(displayed.scale());
    let mut num = requested;
    let mut den = displayed;
    num.rescale(scale);
    den.rescale(scale);

    let num = U256::from(num.mantissa().unsigned_abs());
    let den = U256::from(den.mantissa().unsigned_abs());
    if den.is_zero() {
        return Err(AmountError::ZeroBalance);
    }

    let product = stored_shares
        .checked_mul(num)
        .ok_or(AmountError::Overflow { decimals: 0 })?;
    Ok(product / den)
}

/// Underlying units to withdraw from an aToken market.
///
/// A full withdrawal sends the exact stored balance so display rounding
/// can never ask for more than the position holds.
pub fn withdraw_units(
    requested: Decimal,
    displayed: Decimal,
    stored_units: U256,
    decimals: u8,
) -> Result<U256, AmountError> {
    check_requested(requested, displayed)?;

    if requested == displayed {
        return Ok(stored_units);
    }

    let units = to_units(requested, decimals)?;
    if units > stored_units {
        return Err(AmountError::ExceedsBalance {
            requested,
            available: displayed,
        });
    }
    Ok(units)
}

fn check_requested(requested: Decimal, displayed: Decimal) -> Result<(), AmountError> {
    if requested.is_sign_negative() && !requested.is_zero() {
        return Err(AmountError::Negative);
    }
    if displayed.is_zero() {
        return Err(AmountError::ZeroBalance);
    }
    if requested > displayed {
        return Err(AmountError::ExceedsBalance {
            requested,
            available: displayed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_redeem_uses_stored_shares() {
        let stored = U256::from(95_000_123u64);
        let out = redeem_shares(dec!(100.00), dec!(100.00), stored).unwrap();
        assert_eq!(out, stored);
    }

    #[test]
    fn test_full_redeem_ignores_trailing_zeros() {
        let stored = U256::from(42u8);
        assert_eq!(redeem_shares(dec!(100), dec!(100.00), stored).unwrap(), stored);
    }

    #[test]
    fn test_half_redeem() {
        let out = redeem_shares(dec!(50), dec!(100.00), U256::from(95_000_000u64)).unwrap();
        assert_eq!(out, U256::from(47_500_000u64));
    }

    #[test]
    fn test_proportional_redeem_floors() {
        // 1/3 of 100 shares = 33.33.. → 33
        let out = redeem_shares(dec!(1), dec!(3), U256::from(100u8)).unwrap();
        assert_eq!(out, U256::from(33u8));
    }

    #[test]
    fn test_over_redeem_rejected() {
        let err = redeem_shares(dec!(100.01), dec!(100.00), U256::from(1u8)).unwrap_err();
        assert!(matches!(err, AmountError::ExceedsBalance { .. }));
    }

    #[test]
    fn test_zero_displayed_rejected() {
        let err = redeem_shares(dec!(0), dec!(0.00), U256::ZERO).unwrap_err();
        assert_eq!(err, AmountError::ZeroBalance);
    }

    #[test]
    fn test_a_token_partial_withdraw() {
        let out = withdraw_units(dec!(10.5), dec!(20.00), U256::from(20_000_000u64), 6).unwrap();
        assert_eq!(out, U256::from(10_500_000u64));
    }

    #[test]
    fn test_a_token_full_withdraw_uses_stored_units() {
        // display rounded up from 1.235 to 1.24
        let stored = U256::from(1_235_000u64);
        let out = withdraw_units(dec!(1.24), dec!(1.24), stored, 6).unwrap();
        assert_eq!(out, stored);
    }
}
