//! Binary prediction market state.
//!
//! Markets accept bets while open and fix an outcome when settled.
//! The client only places fixed-stake bets and displays the share of
//! the pot on each side; there is no claim/payout flow.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed stake per bet: 0.000004 ETH in wei.
pub const BET_STAKE_WEI: u64 = 4_000_000_000_000;

/// Which side a bet backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetSide {
    True,
    False,
}

impl std::fmt::Display for BetSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "Yes"),
            Self::False => write!(f, "No"),
        }
    }
}

impl std::str::FromStr for BetSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(Self::True),
            "no" | "false" => Ok(Self::False),
            other => Err(format!("unknown bet side: {other}")),
        }
    }
}

/// Settled outcome as reported by `marketOutcome()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    True,
    False,
    /// Any code other than 0/1.
    Other(u8),
}

impl Outcome {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::False,
            1 => Self::True,
            n => Self::Other(n),
        }
    }
}

/// Lifecycle of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketState {
    /// Bets accepted.
    Open,
    /// Outcome fixed; no further bets.
    Settled(Outcome),
}

impl MarketState {
    pub const fn accepts_bets(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Total wei staked on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetTotals {
    pub total_true: U256,
    pub total_false: U256,
}

impl BetTotals {
    pub const fn new(total_true: U256, total_false: U256) -> Self {
        Self {
            total_true,
            total_false,
        }
    }

    pub fn total(&self) -> U256 {
        self.total_true.saturating_add(self.total_false)
    }

    /// Share of the pot on the True side, percent with one decimal.
    pub fn true_percentage(&self) -> Decimal {
        percentage(self.total_true, self.total())
    }

    pub fn false_percentage(&self) -> Decimal {
        percentage(self.total_false, self.total())
    }

    /// True side holds at least half the pot.
    pub fn is_yes_leading(&self) -> bool {
        self.true_percentage() >= Decimal::from(50)
    }
}

/// `value / total * 100`, rounded half-up to one decimal; 0 when empty.
///
/// `value <= total`. Totals too large to scale by 1000 are shifted down
/// first; the lost low bits are far below one tenth of a percent.
fn percentage(value: U256, total: U256) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    let thousand = U256::from(1000u16);
    let (mut value, mut total) = (value, total);
    while total > U256::MAX / thousand {
        value >>= 16usize;
        total >>= 16usize;
    }
    let tenths = (value * thousand + total / U256::from(2u8)) / total;
    Decimal::new(i64::try_from(tenths.to::<u64>()).unwrap_or(1000), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentages() {
        let totals = BetTotals::new(U256::from(3u8), U256::from(1u8));
        assert_eq!(totals.true_percentage(), dec!(75.0));
        assert_eq!(totals.false_percentage(), dec!(25.0));
        assert!(totals.is_yes_leading());
    }

    #[test]
    fn test_percentages_round_to_one_decimal() {
        let totals = BetTotals::new(U256::from(1u8), U256::from(2u8));
        assert_eq!(totals.true_percentage(), dec!(33.3));
        assert_eq!(totals.false_percentage(), dec!(66.7));
        assert!(!totals.is_yes_leading());
    }

    #[test]
    fn test_empty_market_is_zero() {
        let totals = BetTotals::default();
        assert_eq!(totals.true_percentage(), Decimal::ZERO);
        assert_eq!(totals.false_percentage(), Decimal::ZERO);
    }

    #[test]
    fn test_huge_totals_do_not_wrap() {
        let totals = BetTotals::new(U256::MAX / U256::from(2u8), U256::MAX / U256::from(2u8));
        assert_eq!(totals.true_percentage(), dec!(50.0));
        assert_eq!(totals.false_percentage(), dec!(50.0));

        let lopsided = BetTotals::new(U256::MAX - U256::from(1u8), U256::from(1u8));
        assert_eq!(lopsided.true_percentage(), dec!(100.0));
        assert_eq!(lopsided.false_percentage(), dec!(0.0));
    }

    #[test]
    fn test_even_split_counts_as_yes_leading() {
        let totals = BetTotals::new(U256::from(5u8), U256::from(5u8));
        assert!(totals.is_yes_leading());
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(Outcome::from_code(0), Outcome::False);
        assert_eq!(Outcome::from_code(1), Outcome::True);
        assert_eq!(Outcome::from_code(7), Outcome::Other(7));
        assert!(!MarketState::Settled(Outcome::True).accepts_bets());
        assert!(MarketState::Open.accepts_bets());
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("YES".parse::<BetSide>().unwrap(), BetSide::True);
        assert_eq!("false".parse::<BetSide>().unwrap(), BetSide::False);
        assert!("maybe".parse::<BetSide>().is_err());
    }
}
