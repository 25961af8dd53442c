//! Circulation endpoints: borrow, return, renew, history

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        borrow::{
            BorrowRecordQuery, BorrowRecordView, BorrowRequest, RenewRequest, ReturnRequest,
        },
        Page,
    },
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub borrow_id: i64,
}

/// Check out a copy for the authenticated user
#[utoipa::path(
    post,
    path = "/api/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses((status = 200, description = "Envelope with the new borrow record id"))
)]
pub async fn borrow(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<BorrowRequest>,
) -> AppResult<Json<ApiResponse<BorrowResponse>>> {
    let borrow_id = state
        .services
        .borrows
        .borrow(claims.user_id, req.book_id)
        .await?;
    Ok(ApiResponse::ok(BorrowResponse { borrow_id }))
}

/// Return a copy, reporting its condition
#[utoipa::path(
    post,
    path = "/api/borrows/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses((status = 200, description = "Envelope with the closed borrow record"))
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<ReturnRequest>,
) -> AppResult<Json<ApiResponse<BorrowRecordView>>> {
    let record = state
        .services
        .borrows
        .return_book(claims.user_id, &req)
        .await?;
    Ok(ApiResponse::ok(record))
}

/// Extend an open loan's due date
#[utoipa::path(
    post,
    path = "/api/borrows/renew",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = RenewRequest,
    responses((status = 200, description = "Envelope with the extended borrow record"))
)]
pub async fn renew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<RenewRequest>,
) -> AppResult<Json<ApiResponse<BorrowRecordView>>> {
    let record = state.services.borrows.renew(claims.user_id, &req).await?;
    Ok(ApiResponse::ok(record))
}

/// The authenticated user's borrow history, newest first
#[utoipa::path(
    get,
    path = "/api/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(BorrowRecordQuery),
    responses((status = 200, description = "Envelope with a page of borrow records"))
)]
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowRecordQuery>,
) -> AppResult<Json<ApiResponse<Page<BorrowRecordView>>>> {
    let page = state.services.borrows.list(claims.user_id, &query).await?;
    Ok(ApiResponse::ok(page))
}
