//! Authentication service implementation
//!
//! Registration, password login and session resolution, plus the permission
//! checks shared by the other services.

use std::collections::HashSet;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::{debug, info, warn};
use crate::config::Settings;
use crate::database::UserRepository;
use crate::models::{CreateUserRequest, LoginRequest, RegisterRequest, Role, User};
use crate::services::session::SessionService;
use crate::utils::errors::{LaunchpadError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username, optional_text};
use crate::utils::logging::log_user_action;

const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_DISPLAY_NAME_LENGTH: usize = 80;

/// Permission levels for different operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Any signed-in user
    User,
    /// Owner of the resource in question
    Owner,
    /// Platform administrator
    Admin,
}

impl Permission {
    /// Whether holding `self` grants `required`
    pub fn includes(self, required: Permission) -> bool {
        match self {
            Permission::Admin => true,
            Permission::Owner => matches!(required, Permission::Owner | Permission::User),
            Permission::User => required == Permission::User,
        }
    }
}

/// Who is making a request and what they may do
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub permissions: HashSet<Permission>,
}

impl AuthContext {
    pub fn new(user: User) -> Self {
        let mut permissions = HashSet::new();
        permissions.insert(Permission::User);
        if user.is_admin() {
            permissions.insert(Permission::Admin);
        }

        Self { user, permissions }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.contains(&Permission::Admin)
    }

    /// Strongest permission held over a resource owned by `owner_id`
    pub fn permission_over(&self, owner_id: i64) -> Permission {
        if self.is_admin() {
            Permission::Admin
        } else if self.user.id == owner_id {
            Permission::Owner
        } else {
            Permission::User
        }
    }

    /// Owners manage their own resources; admins manage everything
    pub fn can_manage(&self, owner_id: i64) -> bool {
        self.permission_over(owner_id).includes(Permission::Owner)
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(LaunchpadError::PermissionDenied("admin role required".to_string()))
        }
    }

    pub fn require_manage(&self, owner_id: i64) -> Result<()> {
        if self.can_manage(owner_id) {
            Ok(())
        } else {
            Err(LaunchpadError::PermissionDenied("not the owner of this resource".to_string()))
        }
    }
}

/// Authentication service for accounts and sessions
#[derive(Clone, Debug)]
pub struct AuthService {
    users: UserRepository,
    sessions: SessionService,
    settings: Settings,
}

impl AuthService {
    pub fn new(users: UserRepository, sessions: SessionService, settings: Settings) -> Self {
        Self { users, sessions, settings }
    }

    /// Create an account and open a session for it
    pub async fn register(&self, request: RegisterRequest) -> Result<(User, String)> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_lowercase();

        if !is_valid_email(&email) {
            return Err(LaunchpadError::InvalidInput("email is not valid".to_string()));
        }
        if !is_valid_username(&username) {
            return Err(LaunchpadError::InvalidInput(
                "username must be 3-32 characters of a-z, 0-9 and _".to_string(),
            ));
        }
        self.validate_password(&request.password)?;
        let display_name = optional_text("display_name", request.display_name.as_deref(), MAX_DISPLAY_NAME_LENGTH)?;

        let (email_taken, username_taken) = self.users.exists(&email, &username).await?;
        if email_taken {
            return Err(LaunchpadError::Conflict("email is already registered".to_string()));
        }
        if username_taken {
            return Err(LaunchpadError::Conflict("username is already taken".to_string()));
        }

        let role = if self.settings.is_admin_email(&email) { Role::Admin } else { Role::User };
        let password_hash = hash_password_blocking(request.password).await?;

        let user = self
            .users
            .create(
                CreateUserRequest {
                    email,
                    username,
                    password_hash,
                    display_name,
                    role,
                },
                self.settings.points.signup_bonus,
            )
            .await?;

        let token = self.sessions.create(user.id).await?;

        info!(user_id = user.id, username = %user.username, role = %role, "User registered");
        log_user_action(user.id, "register", None);
        Ok((user, token))
    }

    /// Check credentials and open a session
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String)> {
        let user = match self.users.find_by_login(&request.login).await? {
            Some(user) => user,
            None => {
                debug!("Login attempt for unknown account");
                return Err(LaunchpadError::Unauthorized);
            }
        };

        if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(LaunchpadError::Unauthorized);
        }

        if user.is_banned {
            warn!(user_id = user.id, "Banned user tried to log in");
            return Err(LaunchpadError::UserBanned);
        }

        let token = self.sessions.create(user.id).await?;
        log_user_action(user.id, "login", None);
        Ok((user, token))
    }

    /// End a session; unknown tokens are ignored
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.destroy(token).await
    }

    /// Resolve a session token to its user
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let user_id = self.sessions.resolve(token).await?.ok_or(LaunchpadError::Unauthorized)?;

        let user = match self.users.find_by_id(user_id).await? {
            Some(user) => user,
            None => {
                self.sessions.destroy(token).await?;
                return Err(LaunchpadError::Unauthorized);
            }
        };

        if user.is_banned {
            return Err(LaunchpadError::UserBanned);
        }

        Ok(user)
    }

    fn validate_password(&self, password: &str) -> Result<()> {
        let len = password.chars().count();
        if len < self.settings.auth.min_password_length {
            return Err(LaunchpadError::InvalidInput(format!(
                "password must be at least {} characters",
                self.settings.auth.min_password_length
            )));
        }
        if len > MAX_PASSWORD_LENGTH {
            return Err(LaunchpadError::InvalidInput(format!(
                "password must be at most {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

/// Hash a password with argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LaunchpadError::Internal(format!("password hashing failed: {}", e)))
}

/// Check a password against a stored PHC hash string
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| LaunchpadError::Internal(format!("stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| LaunchpadError::Internal(e.to_string()))?
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| LaunchpadError::Internal(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64, role: &str) -> User {
        User {
            id,
            email: format!("user{}@example.com", id),
            username: format!("user{}", id),
            password_hash: String::new(),
            display_name: None,
            bio: None,
            website_url: None,
            role: role.to_string(),
            points: 0,
            is_banned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_permission_hierarchy() {
        assert!(Permission::Admin.includes(Permission::Owner));
        assert!(Permission::Owner.includes(Permission::User));
        assert!(!Permission::User.includes(Permission::Owner));
        assert!(!Permission::Owner.includes(Permission::Admin));
    }

    #[test]
    fn test_auth_context_for_user() {
        let context = AuthContext::new(user(1, "user"));
        assert!(context.permissions.contains(&Permission::User));
        assert!(!context.is_admin());
        assert_eq!(context.permission_over(1), Permission::Owner);
        assert_eq!(context.permission_over(2), Permission::User);
        assert!(context.can_manage(1));
        assert!(!context.can_manage(2));
        assert!(context.require_admin().is_err());
        assert!(context.require_manage(2).is_err());
    }

    #[test]
    fn test_auth_context_for_admin() {
        let context = AuthContext::new(user(1, "admin"));
        assert!(context.is_admin());
        assert_eq!(context.permission_over(2), Permission::Admin);
        assert!(context.can_manage(2));
        assert!(context.require_admin().is_ok());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-hash").is_err());
    }
}
