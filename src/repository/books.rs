//! Books repository and catalog query construction
//!
//! The search statement is built once and executed verbatim against every
//! configured data source. Column identifiers only ever come from the
//! `FilterField` and `SortColumn` allow-lists; the keyword is the sole bound
//! parameter.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookSnapshot, CreateBook, FilterField, SortColumn},
};

const BOOK_COLUMNS: &str = "book_id, title, author, university, department, year_published";

/// A parameterized catalog search, ready to run against any source pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatement {
    pub sql: String,
    /// The single bound parameter, already wrapped in wildcards and lowercased
    pub keyword: Option<String>,
}

/// Build the catalog search statement from raw query parameters.
///
/// Unrecognized filter fields yield no WHERE clause; sort values outside the
/// allow-list yield no ORDER BY.
pub fn build_search(
    filter: Option<&str>,
    keyword: Option<&str>,
    sort: Option<&str>,
) -> SearchStatement {
    let mut sql = format!("SELECT {} FROM university_books", BOOK_COLUMNS);
    let mut bound = None;

    let field = filter.and_then(FilterField::parse);
    let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());

    if let (Some(field), Some(keyword)) = (field, keyword) {
        match field {
            FilterField::YearPublished => {
                sql.push_str(" WHERE CAST(year_published AS TEXT) LIKE $1");
            }
            _ => {
                sql.push_str(&format!(" WHERE LOWER({}) LIKE $1", field.column()));
            }
        }
        bound = Some(format!("%{}%", keyword.to_lowercase()));
    }

    if let Some(column) = sort.and_then(SortColumn::parse) {
        sql.push_str(&format!(" ORDER BY {}", column.column()));
    }

    SearchStatement { sql, keyword: bound }
}

/// Run a search statement against a source pool
pub async fn run_search(pool: &Pool<Postgres>, stmt: &SearchStatement) -> AppResult<Vec<Book>> {
    let mut query = sqlx::query_as::<_, Book>(&stmt.sql);
    if let Some(ref keyword) = stmt.keyword {
        query = query.bind(keyword);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Fetch a full book row (including the PDF column) from a source pool
pub async fn fetch_snapshot(
    pool: &Pool<Postgres>,
    book_id: i32,
) -> AppResult<Option<BookSnapshot>> {
    let snapshot = sqlx::query_as::<_, BookSnapshot>(&format!(
        "SELECT {}, pdf_file FROM university_books WHERE book_id = $1",
        BOOK_COLUMNS
    ))
    .bind(book_id)
    .fetch_optional(pool)
    .await?;

    Ok(snapshot)
}

/// Fetch a book record (without the PDF column) from a source pool
pub async fn fetch_book(pool: &Pool<Postgres>, book_id: i32) -> AppResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!(
        "SELECT {} FROM university_books WHERE book_id = $1",
        BOOK_COLUMNS
    ))
    .bind(book_id)
    .fetch_optional(pool)
    .await?;

    Ok(book)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, book_id: i32) -> AppResult<Book> {
        fetch_book(&self.pool, book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
    }

    /// All books, ordered by title (librarian dashboard)
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM university_books ORDER BY title",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Create a book, optionally with a PDF attachment
    pub async fn create(
        &self,
        book: &CreateBook,
        pdf: Option<&[u8]>,
        uploaded_by: Option<i32>,
    ) -> AppResult<Book> {
        let book_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO university_books
                (title, author, university, department, year_published, pdf_file, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING book_id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.university)
        .bind(&book.department)
        .bind(book.year_published)
        .bind(pdf)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(book_id).await
    }

    /// Full-field replace; the PDF column is only touched when a new one is given
    pub async fn update(
        &self,
        book_id: i32,
        book: &CreateBook,
        pdf: Option<&[u8]>,
    ) -> AppResult<Book> {
        let result = if let Some(pdf) = pdf {
            sqlx::query(
                r#"
                UPDATE university_books
                SET title = $1, author = $2, university = $3, department = $4,
                    year_published = $5, pdf_file = $6
                WHERE book_id = $7
                "#,
            )
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.university)
            .bind(&book.department)
            .bind(book.year_published)
            .bind(pdf)
            .bind(book_id)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE university_books
                SET title = $1, author = $2, university = $3, department = $4,
                    year_published = $5
                WHERE book_id = $6
                "#,
            )
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.university)
            .bind(&book.department)
            .bind(book.year_published)
            .bind(book_id)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        self.get_by_id(book_id).await
    }

    /// Delete a book
    pub async fn delete(&self, book_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM university_books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        Ok(())
    }

    /// Get a book's title and PDF bytes. The outer Option is the book, the
    /// inner one the attachment.
    pub async fn get_pdf(&self, book_id: i32) -> AppResult<Option<(String, Option<Vec<u8>>)>> {
        let row: Option<(String, Option<Vec<u8>>)> = sqlx::query_as(
            "SELECT title, pdf_file FROM university_books WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_search_has_no_where_or_order() {
        let stmt = build_search(None, None, None);
        assert_eq!(
            stmt.sql,
            "SELECT book_id, title, author, university, department, year_published \
             FROM university_books"
        );
        assert!(stmt.keyword.is_none());
    }

    #[test]
    fn keyword_filter_is_parameterized_and_lowercased() {
        let stmt = build_search(Some("author"), Some("Knuth"), None);
        assert!(stmt.sql.ends_with("WHERE LOWER(author) LIKE $1"));
        assert_eq!(stmt.keyword.as_deref(), Some("%knuth%"));
    }

    #[test]
    fn year_filter_compares_as_text() {
        let stmt = build_search(Some("year_published"), Some("199"), None);
        assert!(stmt.sql.ends_with("WHERE CAST(year_published AS TEXT) LIKE $1"));
        assert_eq!(stmt.keyword.as_deref(), Some("%199%"));
    }

    #[test]
    fn unknown_filter_yields_full_result_set() {
        let stmt = build_search(Some("isbn"), Some("abc"), None);
        assert!(!stmt.sql.contains("WHERE"));
        assert!(stmt.keyword.is_none());
    }

    #[test]
    fn filter_without_keyword_yields_full_result_set() {
        let stmt = build_search(Some("title"), None, None);
        assert!(!stmt.sql.contains("WHERE"));
        let stmt = build_search(Some("title"), Some("   "), None);
        assert!(!stmt.sql.contains("WHERE"));
    }

    #[test]
    fn sort_outside_allow_list_never_reaches_sql() {
        let stmt = build_search(None, None, Some("title; DROP TABLE university_books"));
        assert!(!stmt.sql.contains("ORDER BY"));
        assert!(!stmt.sql.contains("DROP"));
    }

    #[test]
    fn valid_sort_is_appended() {
        let stmt = build_search(None, None, Some("year_published"));
        assert!(stmt.sql.ends_with("ORDER BY year_published"));
    }

    #[test]
    fn filter_and_sort_combine() {
        let stmt = build_search(Some("university"), Some("MIT"), Some("title"));
        assert!(stmt
            .sql
            .ends_with("WHERE LOWER(university) LIKE $1 ORDER BY title"));
        assert_eq!(stmt.keyword.as_deref(), Some("%mit%"));
    }
}
