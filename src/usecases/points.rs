//! Points Tracker Use Case - Cosmetic Rewards Total
//!
//! Appends successful actions to the action log and sums their point
//! values. Storage problems never affect the action that earned the
//! points: writes are warned and dropped, reads fall back to zero.

use std::sync::Arc;

use alloy::primitives::Address;
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::points::{ActionKind, UserAction, total_points};
use crate::ports::repository::ActionRepository;

/// Logs actions and computes the points total per address.
#[derive(Clone)]
pub struct PointsTracker {
  repo: Arc<dyn ActionRepository>,
}

impl PointsTracker {
  pub fn new(repo: Arc<dyn ActionRepository>) -> Self {
    Self { repo }
  }

  /// Record `kind` for `address` at the current time.
  pub async fn record(&self, address: Address, kind: ActionKind) {
    let action = UserAction {
      address: address.to_string(),
      action: kind,
      timestamp: Utc::now().timestamp_millis(),
    };

    match self.repo.append(&action).await {
      Ok(()) => debug!(address = %address, action = ?kind, "User action logged"),
      Err(e) => warn!(address = %address, error = %e, "Failed to log user action"),
    }
  }

  /// Points total for `address`; 0 when the log cannot be read.
  pub async fn total(&self, address: Address) -> u64 {
    match self.repo.actions_for(&address.to_string()).await {
      Ok(actions) => total_points(&actions),
      Err(e) => {
        warn!(address = %address, error = %e, "Failed to calculate user points");
        0
      }
    }
  }
}
