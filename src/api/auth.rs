//! Identity lifecycle endpoints: register, login, logout

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterRequest, Role, Session},
};

use super::{multipart_err, CurrentUser};

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque session token
    pub token: String,
    pub token_type: String,
    /// Page the client should navigate to for this role
    pub landing: String,
    pub user: UserInfo,
}

/// Authenticated identity as seen by clients
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Session> for UserInfo {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            name: session.name.clone(),
            email: session.email.clone(),
            role: session.role,
        }
    }
}

/// Registration response
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i32,
    pub message: String,
}

/// Simple notice response
#[derive(Serialize, ToSchema)]
pub struct NoticeResponse {
    pub message: String,
}

/// Register a new account (multipart: name, email, password, optional
/// profile_image). New accounts are always members.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let mut name = None;
    let mut email = None;
    let mut password = None;
    let mut profile_image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };
        match field_name.as_str() {
            "name" => name = Some(field.text().await.map_err(multipart_err)?),
            "email" => email = Some(field.text().await.map_err(multipart_err)?),
            "password" => password = Some(field.text().await.map_err(multipart_err)?),
            "profile_image" => {
                let bytes = field.bytes().await.map_err(multipart_err)?;
                if !bytes.is_empty() {
                    profile_image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(AppError::Validation(
            "Please fill in all required fields".to_string(),
        ));
    };

    let user = state
        .services
        .auth
        .register(
            RegisterRequest {
                name,
                email,
                password,
            },
            profile_image,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.user_id,
            message: "Account created successfully! Please login.".to_string(),
        }),
    ))
}

/// Member login. Admin accounts are rejected here and pointed at the admin
/// login page; librarians land on their dashboard.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 403, description = "Admin account; use the admin login page")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (session, landing) = state
        .services
        .auth
        .member_login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token.clone(),
        token_type: "Bearer".to_string(),
        landing: landing.to_string(),
        user: UserInfo::from(&session),
    }))
}

/// Logout: destroys the session
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session destroyed", body = NoticeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<NoticeResponse>> {
    state.services.auth.logout(&session.token).await;

    Ok(Json(NoticeResponse {
        message: "You have been logged out".to_string(),
    }))
}
