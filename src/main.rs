//! Campus Site Backend
//!
//! REST backend for a school website: public pages for home, events,
//! graduates and the media gallery, plus a password-gated admin panel.
//! Content lives in a SQLite-backed document store.

mod admin;
mod api;
mod auth;
mod config;
mod db;
mod errors;
mod lightbox;
mod listing;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{LocalSessionProvider, SessionContext, SessionProvider};
use config::Config;
use db::{AccountRepository, ContentStore, SqliteContentStore};
use models::{Event, GalleryItem, Graduate};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub sessions: Arc<dyn SessionProvider>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Campus Site Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let store: Arc<dyn ContentStore> = Arc::new(SqliteContentStore::new(pool.clone()));
    let accounts = AccountRepository::new(pool);

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            if accounts.ensure(email, password).await? {
                tracing::info!("Created admin account {}", email);
            }
        }
        _ => tracing::warn!(
            "No bootstrap admin configured (SITE_ADMIN_EMAIL / SITE_ADMIN_PASSWORD)"
        ),
    }

    let sessions: Arc<dyn SessionProvider> = Arc::new(LocalSessionProvider::new(
        accounts,
        config.session_ttl_secs,
        config.max_signin_attempts,
        config.signin_lockout_secs,
    ));

    // Audit log of admin sign-ins and sign-outs
    let mut audit = SessionContext::init(sessions.as_ref());
    tokio::spawn(async move {
        while let Some(change) = audit.changed().await {
            match change {
                Some(session) => tracing::info!(admin = %session.identifier, "Session started"),
                None => tracing::info!("Session ended"),
            }
        }
        audit.teardown();
    });

    let state = AppState { store, sessions };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let sessions = state.sessions.clone();

    // Admin routes, bearer session required
    let admin_routes = Router::new()
        .route("/home", put(api::update_home))
        .route(
            "/events",
            get(api::admin_list::<Event>).post(api::admin_create::<Event>),
        )
        .route("/events/{id}", delete(api::admin_delete::<Event>))
        .route(
            "/graduates",
            get(api::admin_list::<Graduate>).post(api::admin_create::<Graduate>),
        )
        .route("/graduates/{id}", delete(api::admin_delete::<Graduate>))
        .route(
            "/gallery",
            get(api::admin_list::<GalleryItem>).post(api::admin_create::<GalleryItem>),
        )
        .route("/gallery/{id}", delete(api::admin_delete::<GalleryItem>))
        .layer(middleware::from_fn(move |req, next| {
            auth::require_session(sessions.clone(), req, next)
        }));

    // Public pages and sign-in
    let api_routes = Router::new()
        .route("/home", get(api::get_home))
        .route("/events", get(api::list_events))
        .route("/graduates", get(api::list_graduates))
        .route("/gallery", get(api::list_gallery))
        .route("/gallery/{id}/viewer", get(api::open_viewer))
        .route(
            "/session",
            post(api::sign_in)
                .get(api::current_session)
                .delete(api::sign_out),
        )
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
