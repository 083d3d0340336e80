//! Vote service implementation

use tracing::debug;
use crate::config::Settings;
use crate::database::VoteRepository;
use crate::models::{User, VoteOutcome};
use crate::services::product::ProductService;
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::logging::log_user_action;

#[derive(Clone, Debug)]
pub struct VoteService {
    votes: VoteRepository,
    products: ProductService,
    settings: Settings,
}

impl VoteService {
    pub fn new(votes: VoteRepository, products: ProductService, settings: Settings) -> Self {
        Self { votes, products, settings }
    }

    /// Upvote an approved product. Voting twice changes nothing.
    pub async fn vote(&self, user: &User, product_id: i64) -> Result<VoteOutcome> {
        let product = self.products.find_approved(product_id).await?;

        if product.owner_id == user.id && !self.settings.features.allow_self_votes {
            return Err(LaunchpadError::InvalidInput("you cannot vote for your own product".to_string()));
        }

        let outcome = self
            .votes
            .add(product_id, user.id, self.settings.points.vote_received)
            .await?;

        debug!(product_id = product_id, user_id = user.id, vote_count = outcome.vote_count, "Vote recorded");
        log_user_action(user.id, "vote", Some(&product.slug));
        Ok(outcome)
    }

    /// Withdraw a vote. Withdrawing a missing vote changes nothing.
    pub async fn unvote(&self, user: &User, product_id: i64) -> Result<VoteOutcome> {
        let outcome = self
            .votes
            .remove(product_id, user.id, self.settings.points.vote_received)
            .await?;

        debug!(product_id = product_id, user_id = user.id, vote_count = outcome.vote_count, "Vote removed");
        log_user_action(user.id, "unvote", Some(&product_id.to_string()));
        Ok(outcome)
    }
}
