use crate::{AppState, auth::require_auth, handlers};
use axum::{
    Router,
    middleware,
    routing::{any, get},
};

/// Authenticated Router Module
///
/// The list view and the JSON API. On the API method routers the guard is a `route_layer`,
/// so it runs only for methods that are actually routed; anything else falls through to
/// `handlers::deny` without touching credentials. The `any` routes match every method and
/// take the guard as a plain `layer`.
pub fn authenticated_routes(state: AppState) -> Router<AppState> {
    let guard = || middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        // ANY /
        // The read-only feed. Any method is accepted because the login form posts back
        // to the page that challenged it.
        .route("/", any(handlers::list_page).layer(guard()))
        // ANY /api/login
        // Password login for API clients. The guard answers the POST itself.
        .route("/api/login", any(handlers::api_login).layer(guard()))
        // GET/POST /api/announcements
        .route(
            "/api/announcements",
            get(handlers::list_announcements)
                .post(handlers::create_announcement)
                .route_layer(guard())
                .fallback(handlers::deny),
        )
        // GET/PUT/DELETE /api/announcements/{id}
        .route(
            "/api/announcements/{id}",
            get(handlers::get_announcement)
                .put(handlers::update_announcement)
                .delete(handlers::delete_announcement)
                .route_layer(guard())
                .fallback(handlers::deny),
        )
}
