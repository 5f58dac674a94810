//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] installs logging, loads and validates [`Config`], opens
//! the database, runs migrations, builds the provider registry and serves
//! the router returned by [`create_router`].

// region: --- Imports
use crate::handlers;
use crate::middleware::{log_requests, request_id, stamp_req};
use crate::services::{ChatService, FileService};
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::{routing::{delete, get, post}, Json, Router};
use lib_ai::ProviderRegistry;
use lib_core::model::store::run_migrations;
use lib_core::{create_pool, Config, DbPool};
use lib_utils::{get_env_list, get_env_or};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
// endregion: --- Imports

/// Multipart overhead allowed on top of the largest accepted file.
const UPLOAD_BODY_SLACK: usize = 1024 * 1024;

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub providers: Arc<ProviderRegistry>,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<ProviderRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.providers.clone()
    }
}

impl FromRef<AppState> for ChatService {
    fn from_ref(state: &AppState) -> Self {
        ChatService::new(state.db.clone(), state.providers.clone(), &state.config)
    }
}

impl FromRef<AppState> for FileService {
    fn from_ref(state: &AppState) -> Self {
        FileService::new(state.db.clone())
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
    /// Database migrations path
    pub migrations_path: &'static str,
}

const DEFAULT_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            allowed_origins: DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
            migrations_path: "./migrations",
        }
    }
}

impl ServerConfig {
    /// `BIND_ADDRESS` and comma-separated `ALLOWED_ORIGINS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: get_env_or("BIND_ADDRESS", &defaults.bind_address),
            allowed_origins: get_env_list("ALLOWED_ORIGINS", DEFAULT_ORIGINS),
            migrations_path: defaults.migrations_path,
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Install the global tracing subscriber from `LOG_LEVEL` (default `info`).
///
/// Returns an error when a subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<String> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(&log_level),
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    Ok(log_level)
}

/// Initialize and start the HTTP server
///
/// Reads the process environment as it is; callers load `.env` first.
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - Database connection or migrations fail
/// - The provider HTTP client cannot be built
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let log_level = init_tracing()?;

    info!(" AI CHAT BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    app_config.validate().map_err(|e| anyhow::anyhow!(e))?;

    info!("Connecting to database: {}", app_config.database_url);
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations from: {}", config.migrations_path);
    run_migrations(&pool, std::path::Path::new(config.migrations_path)).await?;
    info!(" Migrations complete");

    let providers = ProviderRegistry::from_settings(&app_config.provider_settings())
        .map_err(|e| anyhow::anyhow!("Failed to build provider clients: {}", e))?;
    info!(
        stream_failure_policy = %app_config.stream_failure_policy,
        auto_create_chats = app_config.auto_create_chats,
        mode_prompt_prefix = app_config.mode_prompt_prefix,
        "Exchange settings"
    );

    let state = AppState {
        db: pool,
        config: app_config,
        providers: Arc::new(providers),
    };

    let app = create_router(state, config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the main application router with all routes
pub fn create_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    use axum::http::{HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::HeaderName::from_static(crate::middleware::REQUEST_ID_HEADER),
        ])
        .expose_headers([axum::http::header::HeaderName::from_static(
            crate::middleware::REQUEST_ID_HEADER,
        )]);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/api/chats",
            get(handlers::chats::list_chats).post(handlers::chats::create_chat),
        )
        .route(
            "/api/chats/available-models/{provider}",
            get(handlers::models::list_models),
        )
        .route(
            "/api/chats/{chat_id}",
            get(handlers::chats::get_chat).delete(handlers::chats::delete_chat),
        )
        .route(
            "/api/chats/{chat_id}/messages",
            get(handlers::chats::list_messages).post(handlers::messages::send_message),
        )
        .route(
            "/api/chats/{chat_id}/messages/stream",
            post(handlers::messages::stream_message),
        )
        .route(
            "/api/chats/{chat_id}/files",
            get(handlers::files::list_files)
                .post(handlers::files::upload_file)
                .layer(DefaultBodyLimit::max(
                    crate::services::files::MAX_FILE_SIZE + UPLOAD_BODY_SLACK,
                )),
        )
        .route(
            "/api/chats/{chat_id}/files/{file_id}",
            delete(handlers::files::delete_file),
        )
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (axum::http::StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
        // Comprehensive request/response logging
        .layer(axum::middleware::from_fn(log_requests))
        // Tower HTTP trace layer for spans
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id(request),
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_failure(|error: tower_http::classify::ServerErrorsFailureClass, latency: std::time::Duration, span: &tracing::Span| {
                    let _enter = span.enter();
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                        error,
                        latency.as_millis()
                    );
                }),
        )
        // Request stamping runs before logging and tracing so both see the ID
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(cors)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "AI Chat API is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "ai-chat-api" }))
}

/// Log server information
fn log_server_info() {
    info!(" CHATS:");
    info!("   • GET    /api/chats");
    info!("   • POST   /api/chats");
    info!("   • GET    /api/chats/{{chat_id}}");
    info!("   • DELETE /api/chats/{{chat_id}}");
    info!(" MESSAGES:");
    info!("   • GET    /api/chats/{{chat_id}}/messages");
    info!("   • POST   /api/chats/{{chat_id}}/messages");
    info!("   • POST   /api/chats/{{chat_id}}/messages/stream (SSE)");
    info!(" MODELS:");
    info!("   • GET    /api/chats/available-models/{{provider}}");
    info!(" FILES:");
    info!("   • GET    /api/chats/{{chat_id}}/files");
    info!("   • POST   /api/chats/{{chat_id}}/files (multipart, field \"file\")");
    info!("   • DELETE /api/chats/{{chat_id}}/files/{{file_id}}");
    info!(" HEALTH:");
    info!("   • GET    /health");
}
// endregion: --- Server Setup
