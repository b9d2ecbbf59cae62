//! Domain layer - Core business logic and models.
//!
//! Pure logic for balances, withdrawals, prediction odds and points.
//! No I/O here (hexagonal architecture inner ring); everything is
//! testable in isolation.

pub mod balance;
pub mod market;
pub mod points;
pub mod prediction;
pub mod transaction;
pub mod units;
pub mod withdrawal;

// Re-export core types for convenience
pub use balance::{DisplayBalance, PositionBalance};
pub use market::{EarnMarket, NftCollection, PredictionMarketInfo, Protocol, SwapToken};
pub use points::{ActionKind, UserAction};
pub use prediction::{BetSide, BetTotals, MarketState, Outcome};
pub use transaction::{ActionCall, SwapParams, TxReceipt};
pub use units::AmountError;
