//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::user::{Permission, User, UserStatus},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new member account with an already-hashed password.
    pub async fn create(&self, username: &str, password_hash: &str, phone: &str) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, password, permission, phone, status)
            VALUES ($1, $2, 'member', $3, 'active')
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotExist, format!("user {} not exist", id)))
    }

    pub async fn get_by_name(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Whether another user (any id except `exclude_id`) holds this name.
    pub async fn name_taken(&self, username: &str, exclude_id: i64) -> AppResult<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1 AND id != $2)")
                .bind(username)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    /// Self-service partial update (password hash and/or phone).
    pub async fn update(
        &self,
        id: i64,
        password_hash: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                password = COALESCE($2, password),
                phone    = COALESCE($3, phone)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotExist, format!("user {} not exist", id)))
    }

    /// Admin partial update.
    pub async fn admin_update(
        &self,
        id: i64,
        username: Option<&str>,
        password_hash: Option<&str>,
        phone: Option<&str>,
        permission: Option<Permission>,
        status: Option<UserStatus>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name       = COALESCE($2, name),
                password   = COALESCE($3, password),
                phone      = COALESCE($4, phone),
                permission = COALESCE($5, permission),
                status     = COALESCE($6, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(phone)
        .bind(permission)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotExist, format!("user {} not exist", id)))
    }

    /// Self-service deletion; id and username must both match.
    pub async fn delete(&self, id: i64, username: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND name = $2")
            .bind(id)
            .bind(username)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::UserNotExist,
                format!("user (id: {}, name: {}) not found for deletion", id, username),
            ));
        }
        Ok(())
    }

    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::UserNotExist,
                format!("user {} not exist for deletion", id),
            ));
        }
        Ok(())
    }

    /// Whether any admin account exists (startup bootstrap check).
    pub async fn any_admin(&self) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE permission = 'admin')")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert the bootstrap admin account.
    pub async fn create_admin(&self, username: &str, password_hash: &str) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, password, permission, status)
            VALUES ($1, $2, 'admin', 'active')
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
