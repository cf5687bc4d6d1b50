//! Personal library ledger service
//!
//! Entries are denormalized snapshots taken at add time: a book later edited
//! or deleted from its source keeps showing the data it had when saved.

use std::str::FromStr;

use crate::{
    error::{AppError, AppResult},
    models::{
        attachment::Attachment,
        book::{SourceTag, SourcedBook},
        library::LibraryEntry,
    },
    repository::Repository,
    services::catalog::CatalogService,
};

/// Outcome of an add: the ledger never duplicates a (user, book) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct LibraryService {
    repository: Repository,
    catalog: CatalogService,
}

impl LibraryService {
    pub fn new(repository: Repository, catalog: CatalogService) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Save a book into the user's library. Idempotent: an existing entry
    /// reports "already present" instead of erroring or duplicating.
    pub async fn add(
        &self,
        user_id: i32,
        book_id: i32,
        source: Option<&str>,
    ) -> AppResult<AddOutcome> {
        let source = match source {
            None => SourceTag::Local,
            Some(s) => SourceTag::from_str(s)
                .map_err(|_| AppError::BadRequest(format!("Invalid source: {}", s)))?,
        };

        let snapshot = self
            .catalog
            .find_in_source(source, book_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Book does not exist in the {} database", source))
            })?;

        let added = self
            .repository
            .library
            .add_snapshot(user_id, &snapshot, source)
            .await?;

        let message = if added {
            format!("Book added to your library from the {} database", source)
        } else {
            "Book is already in your library".to_string()
        };

        Ok(AddOutcome { added, message })
    }

    /// Remove a book from the user's library; absence is a no-op
    pub async fn remove(&self, user_id: i32, book_id: i32) -> AppResult<()> {
        self.repository.library.remove(user_id, book_id).await
    }

    /// All saved books for a user
    pub async fn list(&self, user_id: i32) -> AppResult<Vec<LibraryEntry>> {
        self.repository.library.list(user_id).await
    }

    /// Stream a saved book's PDF snapshot
    pub async fn pdf(&self, user_id: i32, book_id: i32) -> AppResult<Attachment> {
        let pdf = self
            .repository
            .library
            .get_pdf(user_id, book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found in your library".to_string()))?;

        let bytes =
            pdf.ok_or_else(|| AppError::NotFound("No PDF available for this book".to_string()))?;

        Ok(Attachment::pdf(bytes, format!("book_{}.pdf", book_id)))
    }

    /// Re-read the user's Remote-tagged entries live from the remote
    /// catalogs. Entries that no longer resolve are skipped; a source failure
    /// becomes a notice instead of aborting the listing.
    pub async fn remote_refresh(
        &self,
        user_id: i32,
    ) -> AppResult<(Vec<SourcedBook>, Vec<String>)> {
        let book_ids = self.repository.library.remote_book_ids(user_id).await?;

        let mut books = Vec::new();
        let mut notices = Vec::new();

        for book_id in book_ids {
            match self.catalog.fetch_remote_book(book_id).await {
                Ok(Some((book, source_name))) => {
                    books.push(SourcedBook::from_record(book, &source_name));
                }
                Ok(None) => {
                    tracing::debug!("Remote book {} no longer resolves", book_id);
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch remote book {}: {}", book_id, e);
                    notices.push(format!("Cannot fetch remote book {}", book_id));
                }
            }
        }

        Ok((books, notices))
    }
}
