//! EcoParrain Backend
//!
//! REST backend for the referral program: partners register leads, track them
//! through the sales pipeline and earn commissions; admins oversee the whole
//! pipeline. SQLite persistence, session-token auth, LLM coach proxy.

mod analytics;
mod api;
mod auth;
mod coach;
mod commission;
mod config;
mod db;
mod errors;
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

use coach::CoachClient;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub coach: Arc<CoachClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting EcoParrain Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the coach upstream is not configured
    if config.coach_api_key.is_none() {
        tracing::warn!("No coach API key configured (ECOPARRAIN_COACH_API_KEY). Coach endpoint is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize coach client
    let coach = Arc::new(CoachClient::new(&config));

    // Create application state
    let state = AppState {
        repo,
        coach,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
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

    // Clone the repository for the session auth layer
    let session_repo = state.repo.clone();

    // Routes that require a session
    let protected_routes = Router::new()
        // Auth
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me))
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        // Leads
        .route("/leads", get(api::list_leads))
        .route("/leads", post(api::create_lead))
        .route("/leads/{id}", get(api::get_lead))
        .route("/leads/{id}", put(api::update_lead))
        .route("/leads/{id}", delete(api::delete_lead))
        // Notifications
        .route("/notifications", get(api::list_notifications))
        .route("/notifications", delete(api::clear_notifications))
        .route("/notifications/read-all", put(api::mark_all_notifications_read))
        .route("/notifications/{id}/read", put(api::mark_notification_read))
        // Analytics
        .route("/analytics", get(api::get_analytics))
        // Coach
        .route("/coach/message", post(api::coach_message))
        // Apply session auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(session_repo.clone(), req, next)
        }));

    // Routes reachable before login
    let public_routes = Router::new()
        .route("/rates", get(api::get_rates))
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
