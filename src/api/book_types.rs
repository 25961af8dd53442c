//! Catalog (book type) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book_type::{AddBookTypeRequest, BookType, BookTypeQuery, UpdateBookTypeRequest},
        user::Permission,
        Page,
    },
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

/// Create a catalog entry (librarian+)
#[utoipa::path(
    post,
    path = "/api/booktypes",
    tag = "booktypes",
    security(("bearer_auth" = [])),
    request_body = AddBookTypeRequest,
    responses((status = 200, description = "Envelope with the created book type"))
)]
pub async fn add(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<AddBookTypeRequest>,
) -> AppResult<Json<ApiResponse<BookType>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, Permission::Librarian)
        .await?;
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ParamMissing, e.to_string()))?;

    let bt = state.services.book_types.add(&req).await?;
    Ok(ApiResponse::ok(bt))
}

/// Partially update a catalog entry (librarian+)
#[utoipa::path(
    put,
    path = "/api/booktypes/{isbn}",
    tag = "booktypes",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "Catalog ISBN")),
    request_body = UpdateBookTypeRequest,
    responses((status = 200, description = "Envelope with the merged book type"))
)]
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(isbn): Path<String>,
    Json(req): Json<UpdateBookTypeRequest>,
) -> AppResult<Json<ApiResponse<BookType>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, Permission::Librarian)
        .await?;

    let bt = state.services.book_types.update(&isbn, &req).await?;
    Ok(ApiResponse::ok(bt))
}

/// Delete a catalog entry with no remaining copies (librarian+)
#[utoipa::path(
    delete,
    path = "/api/booktypes/{isbn}",
    tag = "booktypes",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "Catalog ISBN")),
    responses((status = 200, description = "Empty envelope"))
)]
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, Permission::Librarian)
        .await?;

    state.services.book_types.delete(&isbn).await?;
    Ok(ApiResponse::empty())
}

/// Search the catalog
#[utoipa::path(
    get,
    path = "/api/booktypes",
    tag = "booktypes",
    params(BookTypeQuery),
    responses((status = 200, description = "Envelope with a page of book types"))
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<BookTypeQuery>,
) -> AppResult<Json<ApiResponse<Page<BookType>>>> {
    let page = state.services.book_types.search(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// Fetch one catalog entry by ISBN
#[utoipa::path(
    get,
    path = "/api/booktypes/{isbn}",
    tag = "booktypes",
    params(("isbn" = String, Path, description = "Catalog ISBN")),
    responses((status = 200, description = "Envelope with the book type"))
)]
pub async fn get_by_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<ApiResponse<BookType>>> {
    let bt = state.services.book_types.get_by_isbn(&isbn).await?;
    Ok(ApiResponse::ok(bt))
}
