//! Business logic services

pub mod auth;
pub mod catalog;
pub mod library;
pub mod sessions;

use crate::repository::Repository;

pub use catalog::SourceHandle;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub library: library::LibraryService,
    pub sessions: sessions::SessionStore,
}

impl Services {
    /// Create all services with the given repository and data sources
    pub fn new(repository: Repository, sources: Vec<SourceHandle>, session_ttl_hours: u64) -> Self {
        let sessions = sessions::SessionStore::new(session_ttl_hours);
        let catalog = catalog::CatalogService::new(repository.clone(), sources);

        Self {
            auth: auth::AuthService::new(repository.clone(), sessions.clone()),
            library: library::LibraryService::new(repository, catalog.clone()),
            catalog,
            sessions,
        }
    }
}
