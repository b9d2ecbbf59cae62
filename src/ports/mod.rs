//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use cases require from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainClient`: contract reads and transaction submission
//! - `Notifier`: user-facing progress/success/failure notices
//! - `ActionRepository`: local action log behind the points total

pub mod chain_client;
pub mod notifier;
pub mod repository;
