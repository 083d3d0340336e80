//! Comment model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::LaunchpadError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub body: String,
    pub status: String,
    pub report_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn status(&self) -> CommentStatus {
        self.status.parse().unwrap_or(CommentStatus::Visible)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Visible,
    Flagged,
    Hidden,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Visible => "visible",
            CommentStatus::Flagged => "flagged",
            CommentStatus::Hidden => "hidden",
        }
    }

    /// Status after a user report
    pub fn after_report(self) -> Result<CommentStatus, LaunchpadError> {
        match self {
            CommentStatus::Visible | CommentStatus::Flagged => Ok(CommentStatus::Flagged),
            CommentStatus::Hidden => Err(LaunchpadError::InvalidStateTransition {
                from: self.to_string(),
                to: CommentStatus::Flagged.to_string(),
            }),
        }
    }

    /// Check an admin moderation decision against the current status
    pub fn check_transition(self, to: CommentStatus) -> Result<(), LaunchpadError> {
        use CommentStatus::*;

        match (self, to) {
            (Visible, Hidden) | (Flagged, Hidden) | (Flagged, Visible) | (Hidden, Visible) => Ok(()),
            (from, to) => Err(LaunchpadError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visible" => Ok(CommentStatus::Visible),
            "flagged" => Ok(CommentStatus::Flagged),
            "hidden" => Ok(CommentStatus::Hidden),
            other => Err(format!("Unknown comment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    pub parent_id: Option<i64>,
}
