//! Copy registry repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::book::{AddBookRequest, Book, BookQuery, BookStatus, UpdateBookRequest},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Register a new physical copy.
    ///
    /// One transaction: insert the copy, then bump both catalog counters.
    /// The counter update affecting zero rows means the ISBN has no
    /// catalog entry; the insert rolls back with it.
    pub async fn create(&self, req: &AddBookRequest) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, location, status, purchase_date, purchase_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&req.isbn)
        .bind(&req.location)
        .bind(req.status)
        .bind(req.purchase_date)
        .bind(req.purchase_price)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE book_types
            SET total_copies = total_copies + 1,
                available_copies = available_copies + 1
            WHERE isbn = $1
            "#,
        )
        .bind(&req.isbn)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::BookTypeNotFound,
                format!("book type with ISBN {} not found, cannot add copy", req.isbn),
            ));
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Partial update; only non-null fields are applied.
    pub async fn update(&self, id: i64, req: &UpdateBookRequest) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                location       = COALESCE($2, location),
                status         = COALESCE($3, status),
                purchase_date  = COALESCE($4, purchase_date),
                purchase_price = COALESCE($5, purchase_price)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.location)
        .bind(req.status)
        .bind(req.purchase_date)
        .bind(req.purchase_price)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookNotExist, format!("book {} not exist", id)))?;

        Ok(book)
    }

    /// Remove a copy and restore the catalog counters.
    ///
    /// `total_copies` always drops by one; `available_copies` only when
    /// the deleted copy was still available. Both steps share one
    /// transaction.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, Book>("DELETE FROM books WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::BookNotExist, format!("book {} not exist, cannot delete", id))
            })?;

        let result = if deleted.status == BookStatus::Available {
            sqlx::query(
                r#"
                UPDATE book_types
                SET total_copies = total_copies - 1,
                    available_copies = available_copies - 1
                WHERE isbn = $1
                "#,
            )
        } else {
            sqlx::query("UPDATE book_types SET total_copies = total_copies - 1 WHERE isbn = $1")
        }
        .bind(&deleted.isbn)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::BookTypeNotFound,
                format!("book type with ISBN {} not found while deleting copy", deleted.isbn),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn search(&self, query: &BookQuery, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)> {
        const PREDICATE: &str = r#"
            ($1::text IS NULL OR isbn = $1)
            AND ($2::bigint IS NULL OR id = $2)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM books WHERE {}",
            PREDICATE
        ))
        .bind(&query.isbn)
        .bind(query.book_id)
        .fetch_one(&self.pool)
        .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let items = sqlx::query_as::<_, Book>(&format!(
            "SELECT * FROM books WHERE {} ORDER BY id DESC LIMIT $3 OFFSET $4",
            PREDICATE
        ))
        .bind(&query.isbn)
        .bind(query.book_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::BookNotExist, format!("book {} not exist", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Whether any copy still references the given catalog entry.
    pub async fn any_with_isbn(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
