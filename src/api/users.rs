//! Identity endpoints

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::user::{
        AdminUpdateUserRequest, LoginRequest, RegisterRequest, UpdateUserRequest, User,
    },
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
}

/// Register a new member account
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses((status = 200, description = "Envelope with the new user id"))
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<RegisterResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::InvalidUsername, e.to_string()))?;

    let user_id = state.services.users.register(&req).await?;
    Ok(ApiResponse::ok(RegisterResponse { user_id }))
}

/// Log in; the profile rides in the body, the token pair in the
/// `Access-Token` / `Refresh-Token` response headers.
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses((status = 200, description = "Envelope with the user profile; tokens as headers"))
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (user, access, refresh) = state
        .services
        .users
        .login(&req.username, &req.password)
        .await?;

    Ok((
        AppendHeaders([("access-token", access), ("refresh-token", refresh)]),
        ApiResponse::ok(user),
    ))
}

#[derive(Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Exchange a refresh token (in the `Refresh-Token` header) for a new
/// access token.
#[utoipa::path(
    post,
    path = "/api/users/refresh",
    tag = "users",
    responses((status = 200, description = "Envelope with a fresh access token"))
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<RefreshResponse>>> {
    let token = headers
        .get("refresh-token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::new(ErrorCode::AuthInvalid, "missing refresh token header"))?;

    let access_token = state.services.users.refresh(token).await?;
    Ok(ApiResponse::ok(RefreshResponse { access_token }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Envelope with the profile"))
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(ApiResponse::ok(user))
}

/// Look up a user's public profile by username
#[utoipa::path(
    get,
    path = "/api/users/{username}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Username to look up")),
    responses((status = 200, description = "Envelope with the profile"))
)]
pub async fn get_by_name(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.services.users.get_by_name(&username).await?;
    Ok(ApiResponse::ok(user))
}

/// Self-service update (password and/or phone)
#[utoipa::path(
    put,
    path = "/api/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateUserRequest,
    responses((status = 200, description = "Envelope with the updated profile"))
)]
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ParamMissing, e.to_string()))?;

    let user = state.services.users.update(claims.user_id, &req).await?;
    Ok(ApiResponse::ok(user))
}

/// Delete own account; the username must be spelled out to confirm.
#[utoipa::path(
    delete,
    path = "/api/users/{username}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Own username, as confirmation")),
    responses((status = 200, description = "Empty envelope"))
)]
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.users.delete(claims.user_id, &username).await?;
    Ok(ApiResponse::empty())
}

/// Admin: update any account
#[utoipa::path(
    put,
    path = "/api/admin/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = AdminUpdateUserRequest,
    responses((status = 200, description = "Envelope with the updated profile"))
)]
pub async fn admin_update(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<AdminUpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, crate::models::user::Permission::Admin)
        .await?;
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ParamMissing, e.to_string()))?;

    let user = state.services.users.admin_update(&req).await?;
    Ok(ApiResponse::ok(user))
}

/// Admin: delete a member account
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Target user id")),
    responses((status = 200, description = "Empty envelope"))
)]
pub async fn admin_delete(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .users
        .require_permission(claims.user_id, crate::models::user::Permission::Admin)
        .await?;

    state.services.users.admin_delete(id).await?;
    Ok(ApiResponse::empty())
}
