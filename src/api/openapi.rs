//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{book_types, books, borrows, health, reservations, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LMS API",
        version = "0.1.0",
        description = "Library Management System REST API"
    ),
    paths(
        // Health
        health::health_check,
        // Users
        users::register,
        users::login,
        users::refresh,
        users::me,
        users::get_by_name,
        users::update,
        users::delete,
        users::admin_update,
        users::admin_delete,
        // Book types
        book_types::add,
        book_types::update,
        book_types::delete,
        book_types::search,
        book_types::get_by_isbn,
        // Books
        books::add,
        books::update,
        books::delete,
        books::search,
        books::get_by_id,
        // Borrows
        borrows::borrow,
        borrows::return_book,
        borrows::renew,
        borrows::list,
        // Reservations
        reservations::reserve,
        reservations::cancel,
        reservations::list,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::Permission,
            crate::models::user::UserStatus,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::UpdateUserRequest,
            crate::models::user::AdminUpdateUserRequest,
            users::RegisterResponse,
            users::RefreshResponse,
            // Book types
            crate::models::book_type::BookType,
            crate::models::book_type::AddBookTypeRequest,
            crate::models::book_type::UpdateBookTypeRequest,
            // Books
            crate::models::book::Book,
            crate::models::book::BookStatus,
            crate::models::book::AddBookRequest,
            crate::models::book::UpdateBookRequest,
            // Borrows
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRecordView,
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::ReturnOutcome,
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::ReturnRequest,
            crate::models::borrow::RenewRequest,
            borrows::BorrowResponse,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::ReserveRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Accounts and authentication"),
        (name = "booktypes", description = "Catalog management"),
        (name = "books", description = "Physical copy management"),
        (name = "borrows", description = "Circulation"),
        (name = "reservations", description = "Reservation ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
