//! Catalog aggregate repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::book_type::{AddBookTypeRequest, BookType, BookTypeQuery, UpdateBookTypeRequest},
};

#[derive(Clone)]
pub struct BookTypesRepository {
    pool: Pool<Postgres>,
}

impl BookTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new catalog entry with zeroed copy counters.
    pub async fn create(&self, req: &AddBookTypeRequest) -> AppResult<BookType> {
        let bt = sqlx::query_as::<_, BookType>(
            r#"
            INSERT INTO book_types
                (isbn, title, author, category, publisher, publish_year, description,
                 total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0)
            RETURNING *
            "#,
        )
        .bind(&req.isbn)
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.category)
        .bind(&req.publisher)
        .bind(req.publish_year)
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(bt)
    }

    /// Partial update; only non-null fields are applied.
    pub async fn update(&self, isbn: &str, req: &UpdateBookTypeRequest) -> AppResult<BookType> {
        let bt = sqlx::query_as::<_, BookType>(
            r#"
            UPDATE book_types SET
                title        = COALESCE($2, title),
                author       = COALESCE($3, author),
                category     = COALESCE($4, category),
                publisher    = COALESCE($5, publisher),
                publish_year = COALESCE($6, publish_year),
                description  = COALESCE($7, description)
            WHERE isbn = $1
            RETURNING *
            "#,
        )
        .bind(isbn)
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.category)
        .bind(&req.publisher)
        .bind(req.publish_year)
        .bind(&req.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::BookTypeNotFound,
                format!("book type with ISBN {} not found", isbn),
            )
        })?;

        Ok(bt)
    }

    /// Delete a catalog entry that no copy references.
    ///
    /// The existence check, the in-use check, and the delete run inside
    /// one transaction with the aggregate row locked, so no copy can be
    /// added to this ISBN between check and delete.
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT isbn FROM book_types WHERE isbn = $1 FOR UPDATE")
                .bind(isbn)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::new(
                ErrorCode::BookTypeNotFound,
                format!("book type with ISBN {} not found", isbn),
            ));
        }

        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&mut *tx)
                .await?;
        if in_use {
            return Err(AppError::new(
                ErrorCode::BookTypeInUse,
                format!("book type {} still has registered copies", isbn),
            ));
        }

        let result = sqlx::query("DELETE FROM book_types WHERE isbn = $1")
            .bind(isbn)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::new(
                ErrorCode::BookTypeNotFound,
                format!("book type with ISBN {} not found, no rows deleted", isbn),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Search catalog entries; returns a page plus the total count
    /// computed under the same filter predicate.
    pub async fn search(&self, query: &BookTypeQuery, limit: i64, offset: i64) -> AppResult<(Vec<BookType>, i64)> {
        const PREDICATE: &str = r#"
            ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
            AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%')
            AND ($3::text IS NULL OR isbn = $3)
            AND ($4::text IS NULL OR category ILIKE '%' || $4 || '%')
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM book_types WHERE {}",
            PREDICATE
        ))
        .bind(&query.title)
        .bind(&query.author)
        .bind(&query.isbn)
        .bind(&query.category)
        .fetch_one(&self.pool)
        .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let items = sqlx::query_as::<_, BookType>(&format!(
            "SELECT * FROM book_types WHERE {} ORDER BY isbn DESC LIMIT $5 OFFSET $6",
            PREDICATE
        ))
        .bind(&query.title)
        .bind(&query.author)
        .bind(&query.isbn)
        .bind(&query.category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<BookType> {
        sqlx::query_as::<_, BookType>("SELECT * FROM book_types WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::BookTypeNotFound,
                    format!("book type with ISBN {} not found", isbn),
                )
            })
    }

    pub async fn exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_types WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
