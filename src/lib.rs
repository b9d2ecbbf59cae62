//! Caribou Client - Library Root
//!
//! Headless client for the Caribou product set on Scroll: lending
//! deposits/withdrawals, NFT mints, token swaps and binary prediction
//! markets. Re-exports all modules for the binary, integration tests
//! and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
