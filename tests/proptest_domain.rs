//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that amount conversion, withdrawal sizing
//! and odds computation hold their invariants across random inputs.

use alloy::primitives::U256;
use proptest::prelude::*;
use rust_decimal::Decimal;

use caribou_client::domain::balance::{DisplayBalance, underlying_from_shares};
use caribou_client::domain::prediction::BetTotals;
use caribou_client::domain::units::{format_units_2dp, parse_units, percent_of, to_units};
use caribou_client::domain::withdrawal::{redeem_shares, withdraw_units};

/// Decimal with two fractional digits from integer cents.
fn cents(c: u64) -> Decimal {
    Decimal::new(i64::try_from(c).unwrap_or(i64::MAX), 2)
}

// ── Unit Conversion Properties ──────────────────────────────

proptest! {
    /// Parsing never rounds up: extra precision is floored away.
    #[test]
    fn parse_units_floors_excess_precision(
        whole in 0u64..1_000_000,
        frac in 0u64..1_000_000_000,
    ) {
        let input = format!("{whole}.{frac:09}");
        let units = parse_units(&input, 6).unwrap();
        let expected = U256::from(whole) * U256::from(1_000_000u64) + U256::from(frac / 1000);
        prop_assert_eq!(units, expected);
    }

    /// Formatting is within half a cent of the exact value.
    #[test]
    fn format_two_places_within_half_cent(raw in 0u64..1_000_000_000_000) {
        let shown: Decimal = format_units_2dp(U256::from(raw), 6).unwrap().parse().unwrap();
        let exact = Decimal::new(i64::try_from(raw).unwrap(), 6);
        prop_assert!((shown - exact).abs() <= Decimal::new(5, 3), "{shown} vs {exact}");
    }

    /// A displayed balance parses back to the figure it shows.
    #[test]
    fn display_balance_parses_back(raw in 0u64..1_000_000_000_000) {
        let display = DisplayBalance::from_units(U256::from(raw), 6);
        let text = display.to_string();
        prop_assert_eq!(display.as_decimal().unwrap().to_string(), text);
    }

    /// 100% of a two-place balance is the balance itself.
    #[test]
    fn full_percentage_is_identity(c in 0u64..10_000_000_000) {
        prop_assert_eq!(percent_of(cents(c), Decimal::ONE_HUNDRED), cents(c));
    }

    /// Exchange rate of exactly 1e18 leaves the share count unchanged.
    #[test]
    fn unit_exchange_rate_is_identity(shares in any::<u64>()) {
        let one = U256::from(1_000_000_000_000_000_000u64);
        prop_assert_eq!(underlying_from_shares(U256::from(shares), one), Some(U256::from(shares)));
    }
}

// ── Withdrawal Sizing Properties ────────────────────────────

proptest! {
    /// Redeemed shares never exceed the stored position.
    #[test]
    fn redeem_never_exceeds_stored(
        displayed in 1u64..10_000_000,
        pct in 0u64..=100,
        stored in any::<u64>(),
    ) {
        let requested = percent_of(cents(displayed), Decimal::from(pct));
        let shares = redeem_shares(requested, cents(displayed), U256::from(stored)).unwrap();
        prop_assert!(shares <= U256::from(stored));
    }

    /// The full displayed amount always redeems the whole position.
    #[test]
    fn full_redeem_takes_everything(displayed in 1u64..10_000_000, stored in any::<u64>()) {
        let shares = redeem_shares(cents(displayed), cents(displayed), U256::from(stored)).unwrap();
        prop_assert_eq!(shares, U256::from(stored));
    }

    /// Anything above the displayed amount is rejected.
    #[test]
    fn over_request_rejected(displayed in 1u64..10_000_000, extra in 1u64..1000) {
        let requested = cents(displayed + extra);
        prop_assert!(redeem_shares(requested, cents(displayed), U256::from(1u8)).is_err());
    }

    /// aToken withdrawals stay within the stored units when the display
    /// matches the stored balance.
    #[test]
    fn a_token_withdraw_within_stored(stored in 10_000u64..1_000_000_000_000, pct in 0u64..=100) {
        let displayed: Decimal = format_units_2dp(U256::from(stored), 6).unwrap().parse().unwrap();
        prop_assume!(!displayed.is_zero());
        let requested = percent_of(displayed, Decimal::from(pct));
        match withdraw_units(requested, displayed, U256::from(stored), 6) {
            Ok(units) => {
                prop_assert!(units <= U256::from(stored));
                if requested < displayed {
                    prop_assert_eq!(units, to_units(requested, 6).unwrap());
                }
            }
            // Display rounded up past the stored units.
            Err(_) => prop_assert!(requested > Decimal::new(i64::try_from(stored).unwrap(), 6)),
        }
    }
}

// ── Odds Properties ─────────────────────────────────────────

proptest! {
    /// Both sides' shares sum to 100 within rounding.
    #[test]
    fn percentages_sum_to_hundred(t in 0u64..u64::MAX / 2, f in 0u64..u64::MAX / 2) {
        prop_assume!(t > 0 || f > 0);
        let totals = BetTotals::new(U256::from(t), U256::from(f));
        let sum = totals.true_percentage() + totals.false_percentage();
        prop_assert!((sum - Decimal::ONE_HUNDRED).abs() <= Decimal::new(1, 1), "sum = {sum}");
    }

    /// Percentages stay in [0, 100].
    #[test]
    fn percentages_bounded(t in any::<u64>(), f in any::<u64>()) {
        let totals = BetTotals::new(U256::from(t), U256::from(f));
        prop_assert!(totals.true_percentage() >= Decimal::ZERO);
        prop_assert!(totals.true_percentage() <= Decimal::ONE_HUNDRED);
    }
}
