//! Reservation ledger repository.
//!
//! Writes and reads only; no repository method moves a reservation to
//! fulfilled or expired.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::reservation::Reservation,
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        book_id: i64,
        isbn: &str,
        expiry_date: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (user_id, book_id, isbn, reserve_date, expiry_date, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(isbn)
        .bind(Utc::now())
        .bind(expiry_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(reservation)
    }

    /// Cancel a pending reservation owned by the user.
    pub async fn cancel(&self, user_id: i64, id: i64) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations SET status = 'cancelled'
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ReservationNotExist,
                format!("pending reservation {} not found for user {}", id, user_id),
            )
        })
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let items = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE user_id = $1
            ORDER BY reserve_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }
}
