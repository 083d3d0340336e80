//! Vote model

use serde::{Deserialize, Serialize};

/// State of a user's vote after a vote/unvote call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub product_id: i64,
    pub voted: bool,
    pub vote_count: i64,
}
