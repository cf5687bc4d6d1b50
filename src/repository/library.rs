//! Personal library ledger repository
//!
//! The (user_id, book_id) primary key is what makes `add` idempotent; the
//! upsert never relies on a separate existence check.

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{BookSnapshot, SourceTag},
        library::LibraryEntry,
    },
};

#[derive(Clone)]
pub struct LibraryRepository {
    pool: Pool<Postgres>,
}

impl LibraryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a snapshot of the book for this user. Returns `true` when a new
    /// entry was created, `false` when the (user, book) pair already existed.
    pub async fn add_snapshot(
        &self,
        user_id: i32,
        snapshot: &BookSnapshot,
        source: SourceTag,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_library
                (user_id, book_id, title, author, university, department,
                 year_published, pdf_file, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(snapshot.book_id)
        .bind(&snapshot.title)
        .bind(&snapshot.author)
        .bind(&snapshot.university)
        .bind(&snapshot.department)
        .bind(snapshot.year_published)
        .bind(snapshot.pdf_file.as_deref())
        .bind(source)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an entry. Absence is not an error.
    pub async fn remove(&self, user_id: i32, book_id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM user_library WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All entries for a user, oldest first
    pub async fn list(&self, user_id: i32) -> AppResult<Vec<LibraryEntry>> {
        let entries = sqlx::query_as::<_, LibraryEntry>(
            r#"
            SELECT book_id, title, author, university, department,
                   year_published, source, added_at
            FROM user_library
            WHERE user_id = $1
            ORDER BY added_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Get an entry's PDF bytes. The outer Option is the entry, the inner one
    /// the attachment.
    pub async fn get_pdf(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> AppResult<Option<Option<Vec<u8>>>> {
        let row: Option<(Option<Vec<u8>>,)> = sqlx::query_as(
            "SELECT pdf_file FROM user_library WHERE user_id = $1 AND book_id = $2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(pdf,)| pdf))
    }

    /// Book ids of the user's Remote-tagged entries
    pub async fn remote_book_ids(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<(i32,)> = sqlx::query_as(
            "SELECT book_id FROM user_library WHERE user_id = $1 AND UPPER(source) = 'REMOTE'",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
