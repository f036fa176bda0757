use crate::{AppState, auth::require_auth, handlers};
use axum::{Router, middleware, routing::any};

/// Admin Router Module
///
/// The admin view. It shares the single shared-secret login with the list view; the
/// difference is only in what gets rendered.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // ANY /admin
        // Feed plus add/edit/delete controls that call the JSON API.
        .route(
            "/admin",
            any(handlers::admin_page)
                .layer(middleware::from_fn_with_state(state, require_auth)),
        )
}
