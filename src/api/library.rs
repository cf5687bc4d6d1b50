//! Personal library endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{attachment::Attachment, book::SourcedBook, library::LibraryEntry},
};

use super::{auth::NoticeResponse, CurrentUser};

/// Add-to-library request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToLibraryRequest {
    /// Which catalog the book lives in: Local (default) or Remote
    pub source: Option<String>,
}

/// Live re-read of the remote-tagged entries
#[derive(Serialize, ToSchema)]
pub struct RemoteLibraryResponse {
    pub books: Vec<SourcedBook>,
    /// Non-fatal per-entry failure notices
    pub notices: Vec<String>,
}

/// Save a book into the caller's library. Calling it again for the same book
/// is a no-op that reports "already present".
#[utoipa::path(
    post,
    path = "/library/add/{book_id}",
    tag = "library",
    security(("bearer_auth" = [])),
    params(("book_id" = i32, Path, description = "Book ID")),
    request_body = AddToLibraryRequest,
    responses(
        (status = 200, description = "Already in the library", body = NoticeResponse),
        (status = 201, description = "Added", body = NoticeResponse),
        (status = 404, description = "Book not found in the named source")
    )
)]
pub async fn add_to_library(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(book_id): Path<i32>,
    body: Option<Json<AddToLibraryRequest>>,
) -> AppResult<(StatusCode, Json<NoticeResponse>)> {
    let source = body.as_ref().and_then(|b| b.source.clone());

    let outcome = state
        .services
        .library
        .add(session.user_id, book_id, source.as_deref())
        .await?;

    let status = if outcome.added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(NoticeResponse {
            message: outcome.message,
        }),
    ))
}

/// List the caller's saved books
#[utoipa::path(
    get,
    path = "/library/my-library",
    tag = "library",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Saved books", body = Vec<LibraryEntry>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_library(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<Vec<LibraryEntry>>> {
    let entries = state.services.library.list(session.user_id).await?;
    Ok(Json(entries))
}

/// Remove a book from the caller's library; removing an absent entry is fine
#[utoipa::path(
    post,
    path = "/library/remove/{book_id}",
    tag = "library",
    security(("bearer_auth" = [])),
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Removed (or was never there)", body = NoticeResponse)
    )
)]
pub async fn remove_from_library(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<NoticeResponse>> {
    state
        .services
        .library
        .remove(session.user_id, book_id)
        .await?;

    Ok(Json(NoticeResponse {
        message: "Book removed from your library".to_string(),
    }))
}

/// Stream a saved book's PDF snapshot
#[utoipa::path(
    get,
    path = "/library/pdf/{book_id}",
    tag = "library",
    security(("bearer_auth" = [])),
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "PDF stream", content_type = "application/pdf"),
        (status = 404, description = "Entry or PDF not found")
    )
)]
pub async fn library_pdf(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(book_id): Path<i32>,
) -> AppResult<Attachment> {
    state.services.library.pdf(session.user_id, book_id).await
}

/// Re-read the caller's Remote-tagged entries live from the remote catalogs
#[utoipa::path(
    get,
    path = "/library/remote-library",
    tag = "library",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Live remote entries", body = RemoteLibraryResponse)
    )
)]
pub async fn remote_library(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<RemoteLibraryResponse>> {
    let (books, notices) = state.services.library.remote_refresh(session.user_id).await?;

    Ok(Json(RemoteLibraryResponse { books, notices }))
}
