// In crates/web-server/src/lib.rs

use std::sync::Arc;

use app_config::types::ServerSettings;
use axum::{
    Router,
    extract::{Query, State},
    http::Uri,
    response::{Html, Json},
    routing::get,
};
use core_types::Symbol;
use engine::{SignalEngine, SymbolSignal};
use tokio::net::TcpListener;
use types::SignalQuery;

pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// The polling dashboard page. It reads `/api/all_signals` every few seconds.
const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// Binance code for an unknown trading pair.
const INVALID_SYMBOL_CODE: i64 = -1121;

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SignalEngine>,
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // The dashboard may be served from another origin.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/all_signals", get(all_signals_handler))
        .route("/signal", get(signal_handler));

    Router::new()
        .route("/", get(dashboard_handler))
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .fallback(not_found_handler)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// The handler for `GET /api/all_signals`: the results of the last cycle.
async fn all_signals_handler(State(state): State<AppState>) -> Json<Vec<SymbolSignal>> {
    Json(state.engine.latest().await)
}

/// The handler for `GET /api/signal?symbol=`.
///
/// Serves the cached entry when the symbol was in the last cycle, otherwise
/// evaluates it live without logging.
async fn signal_handler(
    State(state): State<AppState>,
    Query(params): Query<SignalQuery>,
) -> Result<Json<SymbolSignal>> {
    let symbol = Symbol(params.symbol.trim().to_ascii_uppercase());
    match state.engine.signal_for(&symbol).await {
        Ok(signal) => Ok(Json(signal)),
        Err(engine::Error::Provider(api_client::Error::ApiError { code, .. }))
            if code == INVALID_SYMBOL_CODE =>
        {
            tracing::warn!(symbol = %symbol, "Unknown symbol requested.");
            Err(Error::NotFound(format!("symbol {symbol}")))
        }
        Err(e) => Err(e.into()),
    }
}

async fn not_found_handler(uri: Uri) -> Error {
    Error::NotFound(uri.path().to_string())
}

/// The main entry point for running the web server.
///
/// Serves until the process is terminated or the listener fails.
pub async fn run(settings: ServerSettings, engine: Arc<SignalEngine>) -> Result<()> {
    let app = create_router(AppState { engine });

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;
    tracing::info!("Web server listening on {}", address);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServeError)
}
