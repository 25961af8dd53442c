//! Catalog aggregate service

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book_type::{AddBookTypeRequest, BookType, BookTypeQuery, UpdateBookTypeRequest},
        Page, PageQuery,
    },
    repository::Repository,
    services::validation,
};

#[derive(Clone)]
pub struct BookTypesService {
    repository: Repository,
}

impl BookTypesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a catalog entry. ISBN checksum and author format are
    /// rejected before persistence; duplicates are a conflict.
    pub async fn add(&self, req: &AddBookTypeRequest) -> AppResult<BookType> {
        if !validation::is_valid_isbn(&req.isbn) {
            return Err(AppError::new(ErrorCode::InvalidIsbn, "invalid ISBN format"));
        }
        if !validation::is_valid_author(&req.author) {
            return Err(AppError::new(ErrorCode::InvalidAuthor, "invalid author format"));
        }
        if self.repository.book_types.exists(&req.isbn).await? {
            return Err(AppError::new(ErrorCode::BookTypeExists, "book type already exist"));
        }

        self.repository.book_types.create(req).await
    }

    pub async fn update(&self, isbn: &str, req: &UpdateBookTypeRequest) -> AppResult<BookType> {
        if !validation::is_valid_isbn(isbn) {
            return Err(AppError::new(ErrorCode::InvalidIsbn, "invalid ISBN format"));
        }
        if let Some(ref author) = req.author {
            if !validation::is_valid_author(author) {
                return Err(AppError::new(ErrorCode::InvalidAuthor, "invalid author format"));
            }
        }
        if req.is_empty() {
            return Err(AppError::new(ErrorCode::ParamMissing, "no fields to update"));
        }

        self.repository.book_types.update(isbn, req).await
    }

    /// Delete a catalog entry; refuses while any copy references it.
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        if !validation::is_valid_isbn(isbn) {
            return Err(AppError::new(ErrorCode::InvalidIsbn, "invalid ISBN format"));
        }
        // Early rejection; the repository repeats this check under the
        // aggregate row lock so it stays race-free.
        if self.repository.books.any_with_isbn(isbn).await? {
            return Err(AppError::new(
                ErrorCode::BookTypeInUse,
                format!("book type {} still has registered copies", isbn),
            ));
        }
        self.repository.book_types.delete(isbn).await
    }

    pub async fn search(&self, query: &BookTypeQuery) -> AppResult<Page<BookType>> {
        if let Some(ref isbn) = query.isbn {
            if !validation::is_valid_isbn(isbn) {
                return Err(AppError::new(ErrorCode::InvalidIsbn, "invalid ISBN format"));
            }
        }

        let (limit, offset) = PageQuery {
            page_num: query.page_num,
            page_size: query.page_size,
        }
        .limit_offset();
        let (items, total) = self.repository.book_types.search(query, limit, offset).await?;
        Ok(Page { items, total })
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<BookType> {
        if !validation::is_valid_isbn(isbn) {
            return Err(AppError::new(ErrorCode::InvalidIsbn, "invalid ISBN format"));
        }
        self.repository.book_types.get_by_isbn(isbn).await
    }
}
