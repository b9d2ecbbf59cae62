//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the client's user-facing operations. Each use case is a
//! self-contained business operation.
//!
//! Use cases:
//! - `TxSubmitter`: Approve-then-act transaction lifecycle
//! - `BalanceReconciler`: Supplied and wallet balances per market
//! - `EarnCard`: Deposit/withdraw on a lending market
//! - `NftMinter`: Mint registry NFTs
//! - `Swapper`: Single-pool swaps via the router
//! - `PredictionDesk`: Odds and fixed-stake bets
//! - `Portfolio`: Holdings across the registry
//! - `PointsTracker`: Cosmetic points from the action log

pub mod balance_reconciler;
pub mod earn;
pub mod mint;
pub mod points;
pub mod portfolio;
pub mod prediction;
pub mod submission;
pub mod swap;
