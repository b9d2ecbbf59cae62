//! Repository Port - Action Log Persistence Interface
//!
//! Append-only per-address log of user actions, backing the cosmetic
//! points total. Not authoritative and not synced anywhere.

use async_trait::async_trait;

use crate::domain::points::UserAction;

/// Trait for action log storage.
#[async_trait]
pub trait ActionRepository: Send + Sync + 'static {
  /// Append an action under its address.
  async fn append(&self, action: &UserAction) -> anyhow::Result<()>;

  /// All actions logged for `address`, oldest first.
  async fn actions_for(&self, address: &str) -> anyhow::Result<Vec<UserAction>>;

  /// Check if the backing store is usable.
  async fn is_healthy(&self) -> bool;
}
