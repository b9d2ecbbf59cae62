//! Persistence Adapters - JSON File Storage
//!
//! Implements the action repository port with a single JSON file
//! written atomically. No database dependency.

pub mod action_log;

pub use action_log::ActionLogStore;
