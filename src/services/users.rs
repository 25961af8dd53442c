//! Identity, authentication, and permission gate

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult, ErrorCode},
    models::user::{
        AdminUpdateUserRequest, Permission, RegisterRequest, TokenKind, UpdateUserRequest, User,
        UserClaims,
    },
    repository::Repository,
    services::validation,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new member account; returns the new user id.
    pub async fn register(&self, req: &RegisterRequest) -> AppResult<i64> {
        if !validation::is_valid_phone(&req.phone) {
            return Err(AppError::new(ErrorCode::InvalidPhone, "invalid phone number"));
        }
        if self.repository.users.exists(&req.username).await? {
            return Err(AppError::new(ErrorCode::UserExists, "user already exist"));
        }

        let hash = hash_password(&req.password)?;
        self.repository.users.create(&req.username, &hash, &req.phone).await
    }

    /// Authenticate and issue the access/refresh token pair.
    ///
    /// Unknown user and wrong password produce the same error, so the
    /// endpoint cannot be used to enumerate usernames.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(User, String, String)> {
        let user = self
            .repository
            .users
            .get_by_name(username)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::UserNotExist, "user not found or invalid credentials")
            })?;

        if !verify_password(password, &user.password) {
            return Err(AppError::new(
                ErrorCode::UserNotExist,
                "user not found or invalid credentials",
            ));
        }

        let access = self.issue_token(&user, TokenKind::Access)?;
        let refresh = self.issue_token(&user, TokenKind::Refresh)?;
        Ok((user, access, refresh))
    }

    /// Exchange a valid refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = UserClaims::from_token(
            refresh_token,
            &self.config.refresh_token_secret,
            TokenKind::Refresh,
        )
        .map_err(|_| AppError::new(ErrorCode::AuthInvalid, "invalid refresh token"))?;

        // Re-read the account so a deleted or demoted user does not keep
        // minting access tokens with stale claims.
        let user = self.repository.users.get_by_id(claims.user_id).await?;
        self.issue_token(&user, TokenKind::Access)
    }

    /// Verify an access token at the request boundary.
    pub fn verify_access_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.access_token_secret, TokenKind::Access)
            .map_err(|_| AppError::new(ErrorCode::AuthInvalid, "invalid access token"))
    }

    /// Permission gate backed by the user's current database row, not
    /// the (possibly stale) token claims.
    pub async fn require_permission(&self, user_id: i64, required: Permission) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;
        if user.permission.satisfies(required) {
            Ok(())
        } else {
            Err(AppError::new(ErrorCode::PermissionDenied, "permission denied"))
        }
    }

    /// Self-service partial update.
    pub async fn update(&self, user_id: i64, req: &UpdateUserRequest) -> AppResult<User> {
        if req.password.is_none() && req.phone.is_none() {
            return Err(AppError::new(ErrorCode::ParamMissing, "no fields to update"));
        }
        if let Some(ref phone) = req.phone {
            if !validation::is_valid_phone(phone) {
                return Err(AppError::new(ErrorCode::InvalidPhone, "invalid phone number"));
            }
        }

        let hash = match req.password.as_deref() {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };
        self.repository
            .users
            .update(user_id, hash.as_deref(), req.phone.as_deref())
            .await
    }

    /// Self-service deletion; the caller must name their own account.
    pub async fn delete(&self, user_id: i64, username: &str) -> AppResult<()> {
        self.repository.users.delete(user_id, username).await
    }

    pub async fn get_by_id(&self, user_id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    pub async fn get_by_name(&self, username: &str) -> AppResult<User> {
        self.repository
            .users
            .get_by_name(username)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::UserNotExist, format!("user {} not exist", username))
            })
    }

    /// Admin partial update of any account.
    pub async fn admin_update(&self, req: &AdminUpdateUserRequest) -> AppResult<User> {
        if req.username.is_none()
            && req.password.is_none()
            && req.phone.is_none()
            && req.permission.is_none()
            && req.status.is_none()
        {
            return Err(AppError::new(ErrorCode::ParamMissing, "no fields to update"));
        }

        if let Some(ref username) = req.username {
            if self.repository.users.name_taken(username, req.user_id).await? {
                return Err(AppError::new(
                    ErrorCode::UserExists,
                    format!("username '{}' is already taken", username),
                ));
            }
        }

        let hash = match req.password.as_deref() {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };
        self.repository
            .users
            .admin_update(
                req.user_id,
                req.username.as_deref(),
                hash.as_deref(),
                req.phone.as_deref(),
                req.permission,
                req.status,
            )
            .await
    }

    /// Admin deletion. Staff accounts and users with open loans are
    /// protected.
    pub async fn admin_delete(&self, target_id: i64) -> AppResult<()> {
        let target = self.repository.users.get_by_id(target_id).await?;
        if target.permission.satisfies(Permission::Librarian) {
            return Err(AppError::new(
                ErrorCode::ActionNotAllowed,
                format!(
                    "cannot delete {} account (id: {})",
                    target.permission, target_id
                ),
            ));
        }

        let open = self.repository.borrows.count_open_for_user(target_id).await?;
        if open > 0 {
            return Err(AppError::new(
                ErrorCode::ActionNotAllowed,
                format!("user {} has {} open borrow records, cannot delete", target_id, open),
            ));
        }

        self.repository.users.delete_by_id(target_id).await
    }

    /// Create the bootstrap admin account at first startup if absent.
    pub async fn ensure_admin(&self) -> AppResult<()> {
        if self.repository.users.any_admin().await? {
            return Ok(());
        }
        let hash = hash_password(&self.config.admin_bootstrap_password)?;
        let id = self.repository.users.create_admin("admin", &hash).await?;
        tracing::warn!(
            "bootstrapped admin account (id: {}) with the configured default password; change it",
            id
        );
        Ok(())
    }

    fn issue_token(&self, user: &User, kind: TokenKind) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let (secret, hours) = match kind {
            TokenKind::Access => (
                &self.config.access_token_secret,
                self.config.access_token_hours,
            ),
            TokenKind::Refresh => (
                &self.config.refresh_token_secret,
                self.config.refresh_token_hours,
            ),
        };

        let claims = UserClaims {
            sub: user.name.clone(),
            user_id: user.id,
            permission: user.permission,
            token_type: kind,
            exp: now + hours as i64 * 3600,
            iat: now,
        };
        claims
            .create_token(secret)
            .map_err(|e| AppError::Internal(format!("failed to create token: {}", e)))
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert_ne!(hash, "hunter2!");
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
