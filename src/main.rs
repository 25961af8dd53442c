//! LMS Server - Library Management System
//!
//! REST API server entry point.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lms_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LMS Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.borrowing.clone(),
    );

    // Seed the admin account when the users table has none
    services
        .users
        .ensure_admin()
        .await
        .expect("Failed to bootstrap admin account");

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

    let api_routes = Router::new()
        // Users
        .route("/users/register", post(api::users::register))
        .route("/users/login", post(api::users::login))
        .route("/users/refresh", post(api::users::refresh))
        .route("/users/me", get(api::users::me))
        .route("/users", put(api::users::update))
        .route(
            "/users/:username",
            get(api::users::get_by_name).delete(api::users::delete),
        )
        .route("/admin/users", put(api::users::admin_update))
        .route("/admin/users/:id", delete(api::users::admin_delete))
        // Book types (catalog)
        .route("/booktypes", get(api::book_types::search))
        .route("/booktypes", post(api::book_types::add))
        .route("/booktypes/:isbn", get(api::book_types::get_by_isbn))
        .route("/booktypes/:isbn", put(api::book_types::update))
        .route("/booktypes/:isbn", delete(api::book_types::delete))
        // Books (physical copies)
        .route("/books", get(api::books::search))
        .route("/books", post(api::books::add))
        .route("/books/:id", get(api::books::get_by_id))
        .route("/books/:id", put(api::books::update))
        .route("/books/:id", delete(api::books::delete))
        // Borrows (circulation)
        .route("/borrows", get(api::borrows::list))
        .route("/borrows", post(api::borrows::borrow))
        .route("/borrows/return", post(api::borrows::return_book))
        .route("/borrows/renew", post(api::borrows::renew))
        // Reservations
        .route("/reservations", get(api::reservations::list))
        .route("/reservations", post(api::reservations::reserve))
        .route("/reservations/:id", delete(api::reservations::cancel))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .route("/health", get(api::health::health_check))
        .nest("/api", api_routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
