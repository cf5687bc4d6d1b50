//! Personal library ledger entry

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::SourceTag;

/// A saved-book entry: a point-in-time snapshot of the book taken at add time
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LibraryEntry {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub university: String,
    pub department: String,
    pub year_published: i32,
    pub source: SourceTag,
    pub added_at: DateTime<Utc>,
}
