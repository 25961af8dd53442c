//! Borrow/return/renew engine repository.
//!
//! Every operation here mutates the borrow ledger, the copy status, and
//! the catalog counters as one atomic unit. Mutual exclusion is
//! delegated entirely to Postgres row locks; counter updates assert
//! exactly one row affected instead of trusting an earlier read.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book::{Book, BookStatus},
        borrow::{BorrowRecord, BorrowStatus, BorrowStatusFilter, ReturnOutcome},
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Check a copy out to a user.
    ///
    /// The copy row is locked for the duration of the transaction so two
    /// concurrent borrows of the same copy serialize on the status check.
    pub async fn create(&self, user_id: i64, book_id: i64, loan_period_days: i64) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BookNotExist, "book not exist"))?;

        if book.status != BookStatus::Available {
            return Err(AppError::new(
                ErrorCode::BookNotAvailable,
                format!("book {} is not available (status: {})", book_id, book.status),
            ));
        }

        // Re-check the aggregate counter; catches drift even though the
        // copy status above already implies availability.
        let available: i64 =
            sqlx::query_scalar("SELECT available_copies FROM book_types WHERE isbn = $1")
                .bind(&book.isbn)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::new(
                        ErrorCode::BookTypeNotFound,
                        format!("book type with ISBN {} not found", book.isbn),
                    )
                })?;
        if available <= 0 {
            return Err(AppError::new(
                ErrorCode::ActionNotAllowed,
                format!("no available copies for ISBN {}", book.isbn),
            ));
        }

        let now = Utc::now();
        let due = now + Duration::days(loan_period_days);

        let borrow_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO borrow_records
                (user_id, book_id, checkout_date, due_date, status, renewal_count, late_fee)
            VALUES ($1, $2, $3, $4, 'checked_out', 0, 0)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(due)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE book_types SET available_copies = available_copies - 1 WHERE isbn = $1",
        )
        .bind(&book.isbn)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::BookTypeNotFound,
                format!("failed to update available copies for ISBN {}", book.isbn),
            ));
        }

        sqlx::query("UPDATE books SET status = 'checked_out', last_checkout = $2 WHERE id = $1")
            .bind(book_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(borrow_id)
    }

    /// Close a loan with the given outcome.
    ///
    /// The record must match (id, user, book) exactly, which prevents
    /// returning someone else's loan or a mismatched book/record pair.
    pub async fn close(
        &self,
        user_id: i64,
        book_id: i64,
        borrow_id: i64,
        outcome: ReturnOutcome,
        late_fee: Decimal,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BookNotExist, "book not exist"))?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT * FROM borrow_records
            WHERE id = $1 AND user_id = $2 AND book_id = $3
            FOR UPDATE
            "#,
        )
        .bind(borrow_id)
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::BorrowRecordNotExist,
                format!(
                    "borrow record not found or does not match user/book (id: {}, user_id: {}, book_id: {})",
                    borrow_id, user_id, book_id
                ),
            )
        })?;

        if record.status.is_terminal() {
            return Err(AppError::new(
                ErrorCode::ActionNotAllowed,
                format!("borrow record already in terminal status: {}", record.status),
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE borrow_records
            SET status = $2, late_fee = $3, return_date = $4
            WHERE id = $1 AND user_id = $5
            "#,
        )
        .bind(borrow_id)
        .bind(outcome.record_status())
        .bind(late_fee)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::BorrowRecordNotExist,
                "borrow record not found during return",
            ));
        }

        match outcome {
            ReturnOutcome::Returned => {
                // The copy goes back into circulation.
                let result = sqlx::query(
                    "UPDATE book_types SET available_copies = available_copies + 1 WHERE isbn = $1",
                )
                .bind(&book.isbn)
                .execute(&mut *tx)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(AppError::new(
                        ErrorCode::BookTypeNotFound,
                        format!("failed to restore available copies for ISBN {}", book.isbn),
                    ));
                }

                sqlx::query("UPDATE books SET status = 'available' WHERE id = $1")
                    .bind(book_id)
                    .execute(&mut *tx)
                    .await?;
            }
            ReturnOutcome::Lost | ReturnOutcome::Damaged => {
                // The copy is gone from circulation; counters are
                // deliberately not restored.
                let status = match outcome {
                    ReturnOutcome::Lost => BookStatus::Lost,
                    _ => BookStatus::Damaged,
                };
                sqlx::query("UPDATE books SET status = $2 WHERE id = $1")
                    .bind(book_id)
                    .bind(status)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let updated = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1",
        )
        .bind(borrow_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Extend a loan's due date.
    pub async fn renew(
        &self,
        user_id: i64,
        borrow_id: i64,
        add_days: i64,
        max_renewals: i64,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(borrow_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::BorrowRecordNotExist,
                format!(
                    "borrow record not found (id: {}) or does not belong to user (user_id: {})",
                    borrow_id, user_id
                ),
            )
        })?;

        if record.status != BorrowStatus::CheckedOut {
            return Err(AppError::new(
                ErrorCode::ActionNotAllowed,
                format!("cannot renew, status is '{}', not 'checked_out'", record.status),
            ));
        }
        if record.renewal_count >= max_renewals {
            return Err(AppError::new(
                ErrorCode::ActionNotAllowed,
                format!(
                    "maximum renewal count ({}) reached (current: {})",
                    max_renewals, record.renewal_count
                ),
            ));
        }

        let new_due = record.due_date + Duration::days(add_days);
        let result = sqlx::query(
            r#"
            UPDATE borrow_records
            SET due_date = $2, renewal_count = renewal_count + 1
            WHERE id = $1
            "#,
        )
        .bind(borrow_id)
        .bind(new_due)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::BorrowRecordNotExist,
                format!("borrow record {} not found during renewal", borrow_id),
            ));
        }

        let updated = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1",
        )
        .bind(borrow_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// A user's borrow records under a status filter, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        filter: BorrowStatusFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BorrowRecord>, i64)> {
        let status = match filter {
            BorrowStatusFilter::One(s) => Some(s),
            BorrowStatusFilter::All => None,
        };

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_records
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let items = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT * FROM borrow_records
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY checkout_date DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    /// Count of a user's open (checked_out or overdue) records.
    pub async fn count_open_for_user(&self, user_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_records
            WHERE user_id = $1 AND status IN ('checked_out', 'overdue')
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
