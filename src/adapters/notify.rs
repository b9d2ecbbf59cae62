//! Tracing Notifier - Transaction Notices as Structured Logs
//!
//! Implements the `Notifier` port by emitting one tracing event per
//! notice, and counting final outcomes in Prometheus when a metrics
//! registry is attached.

use std::sync::Arc;

use tracing::{error, info};

use crate::ports::notifier::{Notification, Notifier};

use super::metrics::MetricsRegistry;

#[derive(Default)]
pub struct TracingNotifier {
    metrics: Option<Arc<MetricsRegistry>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn count(&self, label: &str, outcome: &str) {
        if let Some(m) = &self.metrics {
            m.transactions.with_label_values(&[label, outcome]).inc();
        }
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::Pending { label } => info!(notice = "pending", "{label}..."),
            Notification::Success { label, tx_hash } => {
                info!(notice = "success", tx_hash = %tx_hash, "{label}: confirmed");
                self.count(label, "confirmed");
            }
            Notification::Failure { label, reason } => {
                error!(notice = "failure", reason = %reason, "{label}: failed");
                self.count(label, "failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_final_outcomes_only() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let notifier = TracingNotifier::new().with_metrics(Arc::clone(&metrics));

        notifier.notify(&Notification::Pending {
            label: "Minting Caribou NFT".into(),
        });
        notifier.notify(&Notification::Success {
            label: "Minting Caribou NFT".into(),
            tx_hash: "0x01".into(),
        });

        let confirmed = metrics
            .transactions
            .with_label_values(&["Minting Caribou NFT", "confirmed"])
            .get();
        assert_eq!(confirmed, 1);
        let failed = metrics
            .transactions
            .with_label_values(&["Minting Caribou NFT", "failed"])
            .get();
        assert_eq!(failed, 0);
    }
}
