//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, books, health, librarian, library, profile};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "UniLib API",
        version = "1.0.0",
        description = "University Library Catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        // Books
        books::search_books,
        books::add_book,
        // Librarian
        librarian::dashboard,
        librarian::search,
        librarian::add_book,
        librarian::view_book,
        librarian::edit_book,
        librarian::delete_book,
        // Library
        library::add_to_library,
        library::my_library,
        library::remove_from_library,
        library::library_pdf,
        library::remote_library,
        // Admin
        admin::admin_login,
        admin::dashboard,
        admin::update_role,
        admin::delete_user,
        // Profile
        profile::profile,
        profile::edit_profile,
        profile::delete_account,
        profile::profile_image,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterResponse,
            auth::NoticeResponse,
            auth::UserInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::SourcedBook,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            books::SearchResponse,
            // Library
            crate::models::library::LibraryEntry,
            library::AddToLibraryRequest,
            library::RemoteLibraryResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserOverview,
            crate::models::user::RegisterRequest,
            crate::models::user::UpdateProfile,
            crate::models::user::Role,
            admin::UpdateRoleRequest,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            crate::services::catalog::SourceStatus,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Identity lifecycle"),
        (name = "books", description = "Catalog search and add"),
        (name = "librarian", description = "Librarian catalog management"),
        (name = "library", description = "Personal saved-book library"),
        (name = "admin", description = "User administration"),
        (name = "profile", description = "Profile management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
