//! Comment service implementation

use tracing::{debug, info};
use crate::config::Settings;
use crate::database::CommentRepository;
use crate::models::{Comment, CommentStatus, CommentView, CreateCommentRequest, User};
use crate::services::auth::AuthContext;
use crate::services::product::ProductService;
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::{normalize_whitespace, require_text};
use crate::utils::logging::log_user_action;

const MAX_BODY_LENGTH: usize = 2000;

#[derive(Clone, Debug)]
pub struct CommentService {
    comments: CommentRepository,
    products: ProductService,
    settings: Settings,
}

impl CommentService {
    pub fn new(comments: CommentRepository, products: ProductService, settings: Settings) -> Self {
        Self { comments, products, settings }
    }

    /// Comments that are not hidden, oldest first
    pub async fn list(&self, product_id: i64, viewer: Option<&AuthContext>) -> Result<Vec<CommentView>> {
        self.products.find_visible(product_id, viewer).await?;
        self.comments.list_for_product(product_id).await
    }

    /// Comment on an approved product, optionally replying to another comment
    pub async fn add(&self, user: &User, product_id: i64, request: CreateCommentRequest) -> Result<Comment> {
        let product = self.products.find_approved(product_id).await?;
        let body = require_text("body", &normalize_whitespace(&request.body), 1, MAX_BODY_LENGTH)?;

        if let Some(parent_id) = request.parent_id {
            let parent = self
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or(LaunchpadError::CommentNotFound { comment_id: parent_id })?;

            if parent.product_id != product.id {
                return Err(LaunchpadError::InvalidInput(
                    "parent comment belongs to another product".to_string(),
                ));
            }
            if parent.status() == CommentStatus::Hidden {
                return Err(LaunchpadError::InvalidInput("cannot reply to a hidden comment".to_string()));
            }
        }

        let comment = self.comments.create(product.id, user.id, request.parent_id, &body).await?;

        debug!(comment_id = comment.id, product_id = product.id, user_id = user.id, "Comment added");
        log_user_action(user.id, "comment", Some(&product.slug));
        Ok(comment)
    }

    /// Delete a comment and its replies; authors and admins only
    pub async fn delete(&self, ctx: &AuthContext, comment_id: i64) -> Result<()> {
        let comment = self.find(comment_id).await?;
        ctx.require_manage(comment.user_id)?;

        if !self.comments.delete(comment_id).await? {
            return Err(LaunchpadError::CommentNotFound { comment_id });
        }

        info!(comment_id = comment_id, user_id = ctx.user_id(), "Comment deleted");
        Ok(())
    }

    /// Report someone else's comment for moderation
    pub async fn report(&self, user: &User, comment_id: i64) -> Result<Comment> {
        if !self.settings.features.comment_reports {
            return Err(LaunchpadError::PermissionDenied("comment reports are disabled".to_string()));
        }

        let comment = self.find(comment_id).await?;
        if comment.user_id == user.id {
            return Err(LaunchpadError::InvalidInput("you cannot report your own comment".to_string()));
        }

        let reported = self.comments.report(comment_id).await?;

        info!(
            comment_id = comment_id,
            reporter_id = user.id,
            report_count = reported.report_count,
            status = %reported.status,
            "Comment reported"
        );
        Ok(reported)
    }

    async fn find(&self, comment_id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or(LaunchpadError::CommentNotFound { comment_id })
    }
}
