//! Repository layer for database operations

pub mod book_types;
pub mod books;
pub mod borrows;
pub mod reservations;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding the database connection pool.
///
/// The pool handle is injected here once at startup and passed by
/// reference everywhere else; there is no process-wide store handle.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub book_types: book_types::BookTypesRepository,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
    pub reservations: reservations::ReservationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            book_types: book_types::BookTypesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            pool,
        }
    }
}
