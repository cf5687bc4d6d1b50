//! Profile endpoints: view, edit, delete account, profile image

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    error::AppResult,
    models::{attachment::Attachment, user::UpdateProfile},
};

use super::{
    auth::{NoticeResponse, UserInfo},
    multipart_err, CurrentUser,
};

/// The caller's own profile, straight from the session
#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(CurrentUser(session): CurrentUser) -> Json<UserInfo> {
    Json(UserInfo::from(&session))
}

/// Edit the caller's profile (multipart: name, email, current_password,
/// new_password, profile_image — all optional)
#[utoipa::path(
    post,
    path = "/profile/edit_profile",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Wrong current password"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn edit_profile(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<UserInfo>> {
    let mut profile = UpdateProfile::default();
    let mut profile_image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };
        match field_name.as_str() {
            "name" => profile.name = Some(field.text().await.map_err(multipart_err)?),
            "email" => profile.email = Some(field.text().await.map_err(multipart_err)?),
            "current_password" => {
                profile.current_password = Some(field.text().await.map_err(multipart_err)?);
            }
            "new_password" => {
                profile.new_password = Some(field.text().await.map_err(multipart_err)?);
            }
            "profile_image" => {
                let bytes = field.bytes().await.map_err(multipart_err)?;
                if !bytes.is_empty() {
                    profile_image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    let updated = state
        .services
        .auth
        .update_profile(session.user_id, profile, profile_image)
        .await?;

    Ok(Json(UserInfo {
        user_id: updated.user_id,
        name: updated.name,
        email: updated.email,
        role: updated.role,
    }))
}

/// Delete the caller's account. Their sessions and library entries go with it.
#[utoipa::path(
    post,
    path = "/profile/delete_account",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deleted", body = NoticeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn delete_account(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<NoticeResponse>> {
    state.services.auth.delete_account(session.user_id).await?;

    Ok(Json(NoticeResponse {
        message: "Your account has been deleted".to_string(),
    }))
}

/// A user's profile image, or the bundled default when none is stored
#[utoipa::path(
    get,
    path = "/profile_image/{user_id}",
    tag = "profile",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "PNG stream", content_type = "image/png")
    )
)]
pub async fn profile_image(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Attachment> {
    let image = state.services.auth.get_profile_image(user_id).await?;

    Ok(match image {
        Some(bytes) => Attachment::png(bytes, format!("profile_{}.png", user_id)),
        None => Attachment::default_profile_image(),
    })
}
