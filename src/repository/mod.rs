//! Repository layer for database operations

pub mod books;
pub mod library;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding the primary database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub library: library::LibraryRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            library: library::LibraryRepository::new(pool.clone()),
            pool,
        }
    }
}
