//! Admin endpoints: admin login and the user management dashboard

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::user::{User, UserOverview},
};

use super::{
    auth::{LoginRequest, LoginResponse, NoticeResponse, UserInfo},
    CurrentUser,
};

/// Admin dashboard query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// Matches name or email; a numeric term also matches the user id
    pub search: Option<String>,
}

/// Role assignment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// One of member, librarian, admin
    pub role: String,
}

/// Admin login. Non-admin accounts are denied here even with a valid password.
#[utoipa::path(
    post,
    path = "/admin/admin_login",
    tag = "admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 403, description = "Not an admin account")
    )
)]
pub async fn admin_login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (session, landing) = state
        .services
        .auth
        .admin_login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token.clone(),
        token_type: "Bearer".to_string(),
        landing: landing.to_string(),
        user: UserInfo::from(&session),
    }))
}

/// Admin dashboard: list and search users
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "User listing", body = Vec<UserOverview>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<Vec<UserOverview>>> {
    session.require_admin()?;

    let users = state
        .services
        .auth
        .search_users(query.search.as_deref())
        .await?;

    Ok(Json(users))
}

/// Assign a role to a user
#[utoipa::path(
    post,
    path = "/admin/update_role/{user_id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "Invalid role"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(user_id): Path<i32>,
    Json(request): Json<UpdateRoleRequest>,
) -> AppResult<Json<User>> {
    session.require_admin()?;

    let updated = state
        .services
        .auth
        .update_role(user_id, &request.role)
        .await?;

    Ok(Json(updated))
}

/// Delete a user. Admins cannot delete their own account.
#[utoipa::path(
    post,
    path = "/admin/delete_user/{user_id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = NoticeResponse),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Self-deletion rejected")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<NoticeResponse>> {
    session.require_admin()?;

    state.services.auth.delete_user(&session, user_id).await?;

    Ok(Json(NoticeResponse {
        message: "User deleted successfully".to_string(),
    }))
}
