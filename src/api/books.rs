//! Public catalog search and the metadata-only add flow

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, SourcedBook},
};

use super::CurrentUser;

/// Combined multi-source search result
#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub books: Vec<SourcedBook>,
    pub total: usize,
    /// Non-fatal per-source failure notices
    pub notices: Vec<String>,
}

/// Search books across the configured data sources
#[utoipa::path(
    get,
    path = "/",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books, tagged by source", body = SearchResponse),
        (status = 400, description = "Invalid db_source value")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<SearchResponse>> {
    let (books, notices) = state.services.catalog.search(&query).await?;

    Ok(Json(SearchResponse {
        total: books.len(),
        books,
        notices,
    }))
}

/// Add a book without an attachment (any authenticated user)
#[utoipa::path(
    post,
    path = "/add",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state
        .services
        .catalog
        .create_book(book, session.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
