//! User service implementation
//!
//! Public profiles, profile edits and the points history.

use tracing::{debug, info};
use crate::database::{ProductRepository, UserRepository};
use crate::models::{PointsHistory, PublicUser, UpdateUserRequest, User, UserProfile};
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::{pagination, parse_web_url, require_text};

const MAX_DISPLAY_NAME_LENGTH: usize = 80;
const MAX_BIO_LENGTH: usize = 500;

/// User service for managing user operations
#[derive(Clone, Debug)]
pub struct UserService {
    users: UserRepository,
    products: ProductRepository,
}

impl UserService {
    pub fn new(users: UserRepository, products: ProductRepository) -> Self {
        Self { users, products }
    }

    /// Public profile of a user with their approved products
    pub async fn get_profile(&self, username: &str) -> Result<UserProfile> {
        debug!(username = %username, "Getting public profile");

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| LaunchpadError::UserNotFound(username.to_string()))?;

        let products = self.products.list_approved_by_owner(user.id).await?;

        Ok(UserProfile {
            user: PublicUser::from(&user),
            products,
        })
    }

    /// Update user profile. Empty strings clear a field.
    pub async fn update_profile(&self, user: &User, request: UpdateUserRequest) -> Result<User> {
        let request = UpdateUserRequest {
            display_name: clearable(request.display_name, |v| {
                require_text("display_name", v, 1, MAX_DISPLAY_NAME_LENGTH)
            })?,
            bio: clearable(request.bio, |v| require_text("bio", v, 1, MAX_BIO_LENGTH))?,
            website_url: clearable(request.website_url, |v| parse_web_url("website_url", v))?,
        };

        let updated = self.users.update(user.id, request).await?;
        info!(user_id = user.id, "User profile updated successfully");

        Ok(updated)
    }

    /// Current balance and ledger entries, newest first
    pub async fn points_history(&self, user: &User, page: Option<i64>, per_page: Option<i64>) -> Result<PointsHistory> {
        let (limit, offset) = pagination(page, per_page);
        let transactions = self.users.point_transactions(user.id, limit, offset).await?;

        let balance = self
            .users
            .find_by_id(user.id)
            .await?
            .map(|u| u.points)
            .unwrap_or(user.points);

        Ok(PointsHistory { balance, transactions })
    }
}

/// `None` stays `None`, blank becomes `Some("")`, anything else goes through `validate`
fn clearable<F>(value: Option<String>, validate: F) -> Result<Option<String>>
where
    F: FnOnce(&str) -> Result<String>,
{
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(Some(String::new())),
        Some(v) => validate(&v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_clearable_keeps_absent_fields() {
        assert_eq!(clearable(None, |v| Ok(v.to_string())).unwrap(), None);
    }

    #[test]
    fn test_clearable_turns_blank_into_clear() {
        let result = clearable(Some("   ".to_string()), |_| unreachable!()).unwrap();
        assert_eq!(result, Some(String::new()));
    }

    #[test]
    fn test_clearable_validates_values() {
        let result = clearable(Some("ftp://example.com".to_string()), |v| parse_web_url("website_url", v));
        assert_matches!(result, Err(LaunchpadError::InvalidInput(_)));

        let result = clearable(Some("https://example.com".to_string()), |v| parse_web_url("website_url", v));
        assert_eq!(result.unwrap(), Some("https://example.com/".to_string()));
    }
}
