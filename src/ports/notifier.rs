//! Notifier Port - User-facing Transaction Notices
//!
//! The loading/success/failure notices a user sees while a
//! transaction is in flight. Fire-and-forget: notifying never fails
//! and never blocks the submission.

/// A single notice about an operation identified by `label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
  /// Operation started (e.g. "Depositing USDC...").
  Pending { label: String },
  /// Operation confirmed on-chain.
  Success { label: String, tx_hash: String },
  /// Operation failed or reverted.
  Failure { label: String, reason: String },
}

impl Notification {
  pub fn label(&self) -> &str {
    match self {
      Self::Pending { label } | Self::Success { label, .. } | Self::Failure { label, .. } => label,
    }
  }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync + 'static {
  fn notify(&self, notification: &Notification);
}
