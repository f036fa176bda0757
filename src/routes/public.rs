use crate::{AppState, handlers};
use axum::{Router, routing::any};

/// Public Router Module
///
/// Endpoints that must work without credentials.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // ANY /logout
        // Clears the session cookie and redirects to the list view. Logout must always
        // succeed, so it is not guarded.
        .route("/logout", any(handlers::logout))
}
