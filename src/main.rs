//! UniLib Server - University Library Catalog
//!
//! REST API server for a university library catalog spanning one local and
//! any number of remote book databases.

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unilib_server::{
    api,
    config::AppConfig,
    models::book::SourceTag,
    repository::Repository,
    services::{Services, SourceHandle},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("unilib_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting UniLib Server v{}", env!("CARGO_PKG_VERSION"));

    // Create the local database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to local database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // The local store is also the first search source
    let mut sources = vec![SourceHandle {
        name: "Local".to_string(),
        tag: SourceTag::Local,
        pool: pool.clone(),
    }];

    // Remote catalogs connect lazily so a down remote never blocks startup
    for remote in &config.remote_sources {
        let remote_pool = PgPoolOptions::new()
            .max_connections(remote.max_connections)
            .connect_lazy(&remote.url)
            .expect("Invalid remote source URL");

        tracing::info!("Registered remote source {}", remote.name);

        sources.push(SourceHandle {
            name: remote.name.clone(),
            tag: SourceTag::Remote,
            pool: remote_pool,
        });
    }

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, sources, config.sessions.ttl_hours);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Identity lifecycle
        .route("/register", post(api::auth::register))
        .route("/login", post(api::auth::login))
        .route("/logout", get(api::auth::logout))
        // Catalog
        .route("/", get(api::books::search_books))
        .route("/add", post(api::books::add_book))
        // Librarian
        .route("/librarian/", get(api::librarian::dashboard))
        .route("/librarian/search", get(api::librarian::search))
        .route("/librarian/add", post(api::librarian::add_book))
        .route("/librarian/view/:book_id", get(api::librarian::view_book))
        .route("/librarian/edit/:book_id", post(api::librarian::edit_book))
        .route("/librarian/delete/:book_id", post(api::librarian::delete_book))
        // Personal library
        .route("/library/add/:book_id", post(api::library::add_to_library))
        .route("/library/my-library", get(api::library::my_library))
        .route("/library/remove/:book_id", post(api::library::remove_from_library))
        .route("/library/pdf/:book_id", get(api::library::library_pdf))
        .route("/library/remote-library", get(api::library::remote_library))
        // Admin
        .route("/admin/admin_login", post(api::admin::admin_login))
        .route("/admin/dashboard", get(api::admin::dashboard))
        .route("/admin/update_role/:user_id", post(api::admin::update_role))
        .route("/admin/delete_user/:user_id", post(api::admin::delete_user))
        // Profile
        .route("/profile", get(api::profile::profile))
        .route("/profile/edit_profile", post(api::profile::edit_profile))
        .route("/profile/delete_account", post(api::profile::delete_account))
        .route("/profile_image/:user_id", get(api::profile::profile_image))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    routes
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
