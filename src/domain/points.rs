//! Cosmetic reward points.
//!
//! Each successful user action is appended to a per-address log and
//! worth a fixed number of points. The log is local and unverified;
//! totals are decorative only.

use serde::{Deserialize, Serialize};

/// Kinds of actions that earn points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    EarnPosition,
    PredictionBet,
    NftMint,
}

impl ActionKind {
    pub const fn points(self) -> u64 {
        match self {
            Self::EarnPosition => 15,
            Self::PredictionBet => 10,
            Self::NftMint => 5,
        }
    }
}

/// One logged action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAction {
    /// Wallet address as a checksummed hex string.
    pub address: String,
    pub action: ActionKind,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Sum of points over a set of actions.
pub fn total_points(actions: &[UserAction]) -> u64 {
    actions.iter().map(|a| a.action.points()).sum()
}
