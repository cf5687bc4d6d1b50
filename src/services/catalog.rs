//! Catalog service: multi-source book search and librarian catalog management

use sqlx::{Pool, Postgres};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        attachment::Attachment,
        book::{Book, BookQuery, BookSnapshot, CreateBook, SearchScope, SourceTag, SourcedBook},
    },
    repository::{self, Repository},
};

/// A named, independently queried data source
#[derive(Clone)]
pub struct SourceHandle {
    pub name: String,
    pub tag: SourceTag,
    pub pool: Pool<Postgres>,
}

/// Per-source readiness probe result
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct SourceStatus {
    pub name: String,
    pub ok: bool,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    sources: Vec<SourceHandle>,
}

impl CatalogService {
    pub fn new(repository: Repository, sources: Vec<SourceHandle>) -> Self {
        Self {
            repository,
            sources,
        }
    }

    /// Search every data source in scope with one parameterized statement.
    /// A failing source contributes nothing but a notice; the others still
    /// return their rows, tagged with the source name and concatenated.
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<SourcedBook>, Vec<String>)> {
        let scope = SearchScope::parse(query.db_source.as_deref())
            .map_err(AppError::BadRequest)?;

        let stmt = repository::books::build_search(
            query.filter.as_deref(),
            query.keyword.as_deref(),
            query.sort.as_deref(),
        );

        let mut books = Vec::new();
        let mut notices = Vec::new();

        for source in self.sources.iter().filter(|s| scope.covers(s.tag)) {
            match repository::books::run_search(&source.pool, &stmt).await {
                Ok(rows) => {
                    tracing::debug!("Source {} returned {} books", source.name, rows.len());
                    books.extend(
                        rows.into_iter()
                            .map(|book| SourcedBook::from_record(book, &source.name)),
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to search source {}: {}", source.name, e);
                    notices.push(format!(
                        "{} database is unavailable; its results are missing",
                        source.name
                    ));
                }
            }
        }

        Ok((books, notices))
    }

    /// Find a book in any source carrying the given tag, PDF included.
    /// Sources are tried in configuration order; the first hit wins.
    pub async fn find_in_source(
        &self,
        tag: SourceTag,
        book_id: i32,
    ) -> AppResult<Option<BookSnapshot>> {
        for source in self.sources.iter().filter(|s| s.tag == tag) {
            match repository::books::fetch_snapshot(&source.pool, book_id).await {
                Ok(Some(snapshot)) => return Ok(Some(snapshot)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to read source {}: {}", source.name, e);
                }
            }
        }
        Ok(None)
    }

    /// Fetch a book record from the remote catalogs, without the PDF
    pub async fn fetch_remote_book(&self, book_id: i32) -> AppResult<Option<(Book, String)>> {
        for source in self.sources.iter().filter(|s| s.tag == SourceTag::Remote) {
            if let Some(book) = repository::books::fetch_book(&source.pool, book_id).await? {
                return Ok(Some((book, source.name.clone())));
            }
        }
        Ok(None)
    }

    /// The full local catalog, ordered by title
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_all().await
    }

    /// Metadata-only add flow, open to any authenticated user
    pub async fn create_book(&self, book: CreateBook, uploaded_by: i32) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository
            .books
            .create(&book, None, Some(uploaded_by))
            .await
    }

    /// Librarian add flow: every field plus the PDF is required
    pub async fn create_book_with_pdf(
        &self,
        book: CreateBook,
        pdf: Vec<u8>,
        uploaded_by: i32,
    ) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if pdf.is_empty() {
            return Err(AppError::Validation(
                "All fields including PDF are required".to_string(),
            ));
        }

        self.repository
            .books
            .create(&book, Some(&pdf), Some(uploaded_by))
            .await
    }

    /// Librarian edit flow: full replace, PDF only when a new one was uploaded
    pub async fn update_book(
        &self,
        book_id: i32,
        book: CreateBook,
        pdf: Option<Vec<u8>>,
    ) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository
            .books
            .update(book_id, &book, pdf.as_deref())
            .await
    }

    /// Librarian delete flow
    pub async fn delete_book(&self, book_id: i32) -> AppResult<()> {
        self.repository.books.delete(book_id).await
    }

    /// Stream a local book's PDF. Missing book and missing attachment are
    /// both a not-found outcome, never a fault.
    pub async fn book_pdf(&self, book_id: i32) -> AppResult<Attachment> {
        let (title, pdf) = self
            .repository
            .books
            .get_pdf(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let bytes =
            pdf.ok_or_else(|| AppError::NotFound("Book PDF not found".to_string()))?;

        Ok(Attachment::pdf(bytes, format!("{}.pdf", title)))
    }

    /// Ping every configured source with `SELECT 1`
    pub async fn source_health(&self) -> Vec<SourceStatus> {
        let mut statuses = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let ok = sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&source.pool)
                .await
                .is_ok();
            if !ok {
                tracing::warn!("Source {} failed its readiness probe", source.name);
            }
            statuses.push(SourceStatus {
                name: source.name.clone(),
                ok,
            });
        }
        statuses
    }
}
