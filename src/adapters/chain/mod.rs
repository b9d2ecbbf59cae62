//! Chain Adapters - Scroll Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider and wallet session management
//! - Typed contract bindings for every registry protocol
//! - Startup validation of registry addresses
//! - A dry-run wrapper that never sends transactions

pub mod contracts;
pub mod dry_run;
pub mod provider;
pub mod validator;

pub use contracts::ScrollChainClient;
pub use dry_run::DryRunChainClient;
pub use provider::{ScrollProvider, Session};
pub use validator::RegistryValidator;
