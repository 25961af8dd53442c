//! Physical copy endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{AddBookRequest, Book, BookQuery, UpdateBookRequest},
        user::Permission,
        Page,
    },
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

/// Register a physical copy under an existing catalog entry (librarian+)
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = AddBookRequest,
    responses((status = 200, description = "Envelope with the created copy"))
)]
pub async fn add(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<AddBookRequest>,
) -> AppResult<Json<ApiResponse<Book>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, Permission::Librarian)
        .await?;

    let book = state.services.books.add(&req).await?;
    Ok(ApiResponse::ok(book))
}

/// Partially update a copy (librarian+)
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Copy id")),
    request_body = UpdateBookRequest,
    responses((status = 200, description = "Envelope with the merged copy"))
)]
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookRequest>,
) -> AppResult<Json<ApiResponse<Book>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, Permission::Librarian)
        .await?;

    let book = state.services.books.update(id, &req).await?;
    Ok(ApiResponse::ok(book))
}

/// Remove a copy and roll its counters back (librarian+)
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Copy id")),
    responses((status = 200, description = "Empty envelope"))
)]
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, Permission::Librarian)
        .await?;

    state.services.books.delete(id).await?;
    Ok(ApiResponse::empty())
}

/// Search copies by ISBN or id
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(BookQuery),
    responses((status = 200, description = "Envelope with a page of copies"))
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<ApiResponse<Page<Book>>>> {
    let page = state.services.books.search(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// Fetch one copy by id
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Copy id")),
    responses((status = 200, description = "Envelope with the copy"))
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(ApiResponse::ok(book))
}
