//! Librarian endpoints: catalog management with PDF attachments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{
        attachment::Attachment,
        book::{Book, BookQuery, CreateBook},
    },
};

use super::{auth::NoticeResponse, multipart_err, CurrentUser};

/// Librarian catalog search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LibrarianSearchQuery {
    pub keyword: Option<String>,
    /// Searchable column; unrecognized values fall back to title
    pub filter: Option<String>,
}

/// Book fields collected from a multipart form
#[derive(Debug, Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    university: Option<String>,
    department: Option<String>,
    year_published: Option<String>,
    pdf: Option<Vec<u8>>,
}

impl BookForm {
    async fn collect(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "title" => form.title = Some(field.text().await.map_err(multipart_err)?),
                "author" => form.author = Some(field.text().await.map_err(multipart_err)?),
                "university" => {
                    form.university = Some(field.text().await.map_err(multipart_err)?);
                }
                "department" => {
                    form.department = Some(field.text().await.map_err(multipart_err)?);
                }
                "year_published" => {
                    form.year_published = Some(field.text().await.map_err(multipart_err)?);
                }
                "pdf_file" => {
                    let bytes = field.bytes().await.map_err(multipart_err)?;
                    if !bytes.is_empty() {
                        form.pdf = Some(bytes.to_vec());
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Turn the collected fields into a create request. All metadata fields
    /// are required; a non-numeric year is a validation error.
    fn into_request(self) -> AppResult<(CreateBook, Option<Vec<u8>>)> {
        let (Some(title), Some(author), Some(university), Some(department), Some(year)) = (
            self.title,
            self.author,
            self.university,
            self.department,
            self.year_published,
        ) else {
            return Err(AppError::Validation(
                "All fields are required".to_string(),
            ));
        };

        let year_published: i32 = year
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Year must be a number".to_string()))?;

        Ok((
            CreateBook {
                title: title.trim().to_string(),
                author: author.trim().to_string(),
                university: university.trim().to_string(),
                department: department.trim().to_string(),
                year_published,
            },
            self.pdf,
        ))
    }
}

/// Librarian dashboard: the full catalog, ordered by title
#[utoipa::path(
    get,
    path = "/librarian/",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
) -> AppResult<Json<Vec<Book>>> {
    session.require_librarian()?;

    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Search the local catalog. Unrecognized filters fall back to title.
#[utoipa::path(
    get,
    path = "/librarian/search",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(LibrarianSearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn search(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<LibrarianSearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    session.require_librarian()?;

    let filter = match query.filter.as_deref() {
        Some("author") | Some("university") | Some("department") => query.filter.clone(),
        _ => Some("title".to_string()),
    };

    let (books, _notices) = state
        .services
        .catalog
        .search(&BookQuery {
            filter,
            keyword: query.keyword,
            sort: Some("title".to_string()),
            db_source: Some("local".to_string()),
        })
        .await?;

    let books = books
        .into_iter()
        .map(|b| Book {
            book_id: b.book_id,
            title: b.title,
            author: b.author,
            university: b.university,
            department: b.department,
            year_published: b.year_published,
        })
        .collect();

    Ok(Json(books))
}

/// Add a book with its PDF (multipart; every field including the PDF is
/// required)
#[utoipa::path(
    post,
    path = "/librarian/add",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing field or non-numeric year"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    session.require_librarian()?;

    let (book, pdf) = BookForm::collect(multipart).await?.into_request()?;

    let pdf = pdf.ok_or_else(|| {
        AppError::Validation("All fields including PDF are required".to_string())
    })?;

    let created = state
        .services
        .catalog
        .create_book_with_pdf(book, pdf, session.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Stream a book's PDF
#[utoipa::path(
    get,
    path = "/librarian/view/{book_id}",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "PDF stream", content_type = "application/pdf"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book or PDF not found")
    )
)]
pub async fn view_book(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(book_id): Path<i32>,
) -> AppResult<Attachment> {
    session.require_librarian()?;

    state.services.catalog.book_pdf(book_id).await
}

/// Edit a book: full field replace, PDF only when a new one is uploaded
#[utoipa::path(
    post,
    path = "/librarian/edit/{book_id}",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Missing field or non-numeric year"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn edit_book(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(book_id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    session.require_librarian()?;

    let (book, pdf) = BookForm::collect(multipart).await?.into_request()?;

    let updated = state
        .services
        .catalog
        .update_book(book_id, book, pdf)
        .await?;

    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    post,
    path = "/librarian/delete/{book_id}",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(("book_id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = NoticeResponse),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    CurrentUser(session): CurrentUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<NoticeResponse>> {
    session.require_librarian()?;

    state.services.catalog.delete_book(book_id).await?;

    Ok(Json(NoticeResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
