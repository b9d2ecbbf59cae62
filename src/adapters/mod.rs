//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, file I/O, logging).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: Scroll blockchain interaction via alloy-rs
//! - `metrics`: Prometheus metrics export and health checks
//! - `notify`: Transaction notices as tracing events
//! - `persistence`: JSON action log for points

pub mod chain;
pub mod metrics;
pub mod notify;
pub mod persistence;
