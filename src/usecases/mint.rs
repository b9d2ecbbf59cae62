//! NFT Mint Use Case
//!
//! `safeMint(to)` on one of the registry collections, minting to the
//! session account. No token is spent, so there is no approval step.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::market::NftCollection;
use crate::domain::points::ActionKind;
use crate::domain::transaction::ActionCall;
use crate::ports::chain_client::ChainClient;

use super::points::PointsTracker;
use super::submission::{SubmitError, SubmitOutcome, TxSubmitter};

pub struct NftMinter<C: ChainClient> {
  submitter: Arc<TxSubmitter<C>>,
  points: Option<PointsTracker>,
}

impl<C: ChainClient> NftMinter<C> {
  pub fn new(submitter: Arc<TxSubmitter<C>>) -> Self {
    Self {
      submitter,
      points: None,
    }
  }

  #[must_use]
  pub fn with_points(mut self, points: PointsTracker) -> Self {
    self.points = Some(points);
    self
  }

  /// Mint one token of `collection` to the connected account.
  #[instrument(skip(self, collection), fields(collection = collection.name))]
  pub async fn mint(&self, collection: &NftCollection) -> Result<SubmitOutcome, SubmitError> {
    let owner = self.submitter.owner()?;
    let call = ActionCall::SafeMint {
      collection: collection.address,
      to: owner,
    };

    let outcome = self
      .submitter
      .submit(&format!("Minting {}", collection.name), None, call)
      .await?;

    if outcome.is_confirmed() {
      if let Some(points) = &self.points {
        points.record(owner, ActionKind::NftMint).await;
      }
    }

    Ok(outcome)
  }
}
