//! Business logic services

pub mod book_types;
pub mod books;
pub mod borrows;
pub mod reservations;
pub mod users;
pub mod validation;

use crate::{
    config::{AuthConfig, BorrowingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub book_types: book_types::BookTypesService,
    pub books: books::BooksService,
    pub borrows: borrows::BorrowsService,
    pub reservations: reservations::ReservationsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth: AuthConfig, borrowing: BorrowingConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth),
            book_types: book_types::BookTypesService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone(), borrowing),
            reservations: reservations::ReservationsService::new(repository),
        }
    }
}
