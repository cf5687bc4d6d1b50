//! Book model and catalog query types

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record as listed in catalogs (the PDF column is never selected here)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub university: String,
    pub department: String,
    pub year_published: i32,
}

/// Book record plus the name of the data source it came from
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SourcedBook {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub university: String,
    pub department: String,
    pub year_published: i32,
    /// Name of the data source this record came from
    pub source: String,
}

impl SourcedBook {
    pub fn from_record(book: Book, source: &str) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            author: book.author,
            university: book.university,
            department: book.department,
            year_published: book.year_published,
            source: source.to_string(),
        }
    }
}

/// Full book row including the PDF column, copied into library snapshots
#[derive(Debug, Clone, FromRow)]
pub struct BookSnapshot {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub university: String,
    pub department: String,
    pub year_published: i32,
    pub pdf_file: Option<Vec<u8>>,
}

/// Which end of the local/remote pair a record or ledger entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SourceTag {
    Local,
    Remote,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Local => "Local",
            SourceTag::Remote => "Remote",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(SourceTag::Local),
            "remote" => Ok(SourceTag::Remote),
            _ => Err(format!("Invalid source tag: {}", s)),
        }
    }
}

// SQLx conversion for SourceTag (stored as text)
impl sqlx::Type<Postgres> for SourceTag {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for SourceTag {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for SourceTag {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Which data sources a search should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Local,
    Remote,
    All,
}

impl SearchScope {
    /// Parse the `db_source` query parameter; absence means all sources
    pub fn parse(s: Option<&str>) -> Result<Self, String> {
        match s {
            None => Ok(SearchScope::All),
            Some(s) => match s.to_lowercase().as_str() {
                "local" => Ok(SearchScope::Local),
                "remote" => Ok(SearchScope::Remote),
                "all" => Ok(SearchScope::All),
                other => Err(format!("Invalid db_source: {}", other)),
            },
        }
    }

    pub fn covers(&self, tag: SourceTag) -> bool {
        match self {
            SearchScope::All => true,
            SearchScope::Local => tag == SourceTag::Local,
            SearchScope::Remote => tag == SourceTag::Remote,
        }
    }
}

/// Searchable columns for the keyword filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    University,
    Author,
    Title,
    Department,
    YearPublished,
}

impl FilterField {
    /// Parse the `filter` query parameter; unrecognized values yield no filter
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "university" => Some(FilterField::University),
            "author" => Some(FilterField::Author),
            "title" => Some(FilterField::Title),
            "department" => Some(FilterField::Department),
            "year_published" => Some(FilterField::YearPublished),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            FilterField::University => "university",
            FilterField::Author => "author",
            FilterField::Title => "title",
            FilterField::Department => "department",
            FilterField::YearPublished => "year_published",
        }
    }
}

/// Sortable columns. Anything outside this list never reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    BookId,
    Title,
    Author,
    University,
    Department,
    YearPublished,
}

impl SortColumn {
    /// Parse the `sort` query parameter against the allow-list
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "book_id" => Some(SortColumn::BookId),
            "title" => Some(SortColumn::Title),
            "author" => Some(SortColumn::Author),
            "university" => Some(SortColumn::University),
            "department" => Some(SortColumn::Department),
            "year_published" => Some(SortColumn::YearPublished),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortColumn::BookId => "book_id",
            SortColumn::Title => "title",
            SortColumn::Author => "author",
            SortColumn::University => "university",
            SortColumn::Department => "department",
            SortColumn::YearPublished => "year_published",
        }
    }
}

/// Catalog search query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Column to match the keyword against
    pub filter: Option<String>,
    /// Case-insensitive substring to search for
    pub keyword: Option<String>,
    /// Sort column (must be in the allow-list, otherwise ignored)
    pub sort: Option<String>,
    /// Data sources to search: local, remote or all (default)
    pub db_source: Option<String>,
}

/// Create book request (metadata-only add flow)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "University is required"))]
    pub university: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
    pub year_published: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parse_known_fields() {
        assert_eq!(FilterField::parse("author"), Some(FilterField::Author));
        assert_eq!(
            FilterField::parse("year_published"),
            Some(FilterField::YearPublished)
        );
        assert_eq!(FilterField::parse("isbn"), None);
    }

    #[test]
    fn sort_allow_list_rejects_raw_input() {
        assert_eq!(SortColumn::parse("title"), Some(SortColumn::Title));
        assert_eq!(SortColumn::parse("book_id"), Some(SortColumn::BookId));
        assert_eq!(SortColumn::parse("title; DROP TABLE users"), None);
        assert_eq!(SortColumn::parse("TITLE"), None);
    }

    #[test]
    fn scope_parse_defaults_to_all() {
        assert_eq!(SearchScope::parse(None).unwrap(), SearchScope::All);
        assert_eq!(SearchScope::parse(Some("Remote")).unwrap(), SearchScope::Remote);
        assert!(SearchScope::parse(Some("both")).is_err());
    }

    #[test]
    fn scope_coverage() {
        assert!(SearchScope::All.covers(SourceTag::Local));
        assert!(SearchScope::All.covers(SourceTag::Remote));
        assert!(SearchScope::Local.covers(SourceTag::Local));
        assert!(!SearchScope::Local.covers(SourceTag::Remote));
        assert!(!SearchScope::Remote.covers(SourceTag::Local));
    }
}
