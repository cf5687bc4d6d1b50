//! API handlers for UniLib REST endpoints

pub mod admin;
pub mod auth;
pub mod books;
pub mod health;
pub mod librarian;
pub mod library;
pub mod openapi;
pub mod profile;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::user::Session, AppState};

/// Landing pages used in login responses and authorization redirects
pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_LOGIN_PATH: &str = "/admin/admin_login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const LIBRARIAN_HOME_PATH: &str = "/librarian/";
pub const PROFILE_PATH: &str = "/profile";

/// Extractor for the authenticated user's session
pub struct CurrentUser(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Please login first".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        // Resolve the token against the session store
        let session = state
            .services
            .sessions
            .resolve(token)
            .await
            .ok_or_else(|| AppError::Authentication("Invalid or expired session".to_string()))?;

        Ok(CurrentUser(session))
    }
}

/// Map a multipart decoding failure onto the validation taxonomy
pub(crate) fn multipart_err(e: axum_extra::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart payload: {}", e))
}
