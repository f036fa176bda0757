use axum::{
    Json, Router,
    extract::FromRef,
    http::{HeaderName, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any;
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod paths;
pub mod repository;
pub mod session;
pub mod storage;
pub mod views;

// Route groups by access level (public, guarded, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{KvRepository, RepositoryState};
pub use storage::{MemoryKvStore, S3KvStore, StoreState};

/// ApiDoc
///
/// OpenAPI description of the JSON API. Paths are relative to the board's base path,
/// which is filled in as the server URL when the document is served.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::api_login, handlers::list_announcements, handlers::get_announcement,
        handlers::create_announcement, handlers::update_announcement,
        handlers::delete_announcement
    ),
    components(
        schemas(
            models::Announcement, models::AnnouncementPayload, models::LoginPayload,
            models::Pagination, models::AnnouncementPage, models::CreatedResponse,
            models::SuccessResponse, models::ErrorResponse,
        )
    ),
    tags(
        (name = "announcements", description = "Announcement board API")
    )
)]
pub struct ApiDoc;

/// api_doc
///
/// The OpenAPI document with the board's base path as its server URL.
pub fn api_doc(base_path: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let server = if base_path.is_empty() { "/" } else { base_path };
    doc.servers = Some(vec![utoipa::openapi::server::Server::new(server)]);
    doc
}

/// AppState
///
/// The single container shared by every request: the persistence layer and the
/// immutable configuration (which also carries the auth guard's credentials).
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the board, mounts it under the configured base path and applies the global
/// middleware stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(AnyOrigin)
        .allow_origin(AnyOrigin)
        .allow_headers(AnyOrigin);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Board Router Assembly (paths relative to the base path)
    let board_router = Router::new()
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes(state.clone()))
        .merge(admin::admin_routes(state.clone()))
        // Default deny: anything unmatched inside the base path.
        .fallback(handlers::deny)
        .with_state(state.clone());

    // 3. Base-path scoping: the root and foreign paths never reach the board.
    let scoped_board = Router::new()
        .fallback_service(board_router)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            paths::scope_to_base_path,
        ));

    let mut app = Router::new();
    // Opt-in only: the document lives outside the base path and names every route.
    if state.config.api_docs {
        let doc = api_doc(&state.config.base_path);
        app = app.route(
            "/api-docs/openapi.json",
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        );
    }

    // 4. Response hygiene, then the Observability and Correlation Layers (outermost last)
    app.fallback_service(scoped_board)
        .layer(middleware::map_response(cache::disable_caching))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer
        .layer(cors)
}

/// handle_panic
///
/// Converts a handler panic into a plain 500 so a single bad request never takes the
/// connection down or leaks the panic message.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cache::no_cache_headers(),
        Json(models::ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

/// trace_span_logger
///
/// Used by `TraceLayer` to open the per-request span. Includes the `x-request-id`
/// so every log line for one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
