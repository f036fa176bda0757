use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::{
    AppState,
    cache::no_cache_headers,
    config::AuthConfig,
    models::{ErrorResponse, LoginPayload, SuccessResponse},
    session::{self, COOKIE_NAME},
    views,
};

/// The board-relative path of the JSON login endpoint. Exempt from the API token check.
pub const API_LOGIN_PATH: &str = "/api/login";
const API_PREFIX: &str = "/api/";

/// AuthResult
///
/// The outcome of running the guard over one request.
pub enum AuthResult {
    /// The request may proceed; the untouched request is handed back.
    Allowed(Request),
    /// The password was accepted. Carries the session cookie plus a redirect (pages)
    /// or a JSON success body (API login).
    Authenticated(Response),
    /// No usable credential: the login page, or a JSON challenge on API paths.
    Challenge(Response),
    /// A bad API token on an API path. API paths never fall back to cookie auth.
    Denied(Response),
}

impl AuthResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthResult::Allowed(_))
    }
}

/// authorize
///
/// Decides whether `request` may reach a protected handler. `request` must already carry
/// the board-relative path (see `paths::scope_to_base_path`); `home` is the absolute path
/// of the list view, used as the post-login redirect target.
///
/// The decision order is:
/// 1. No shared secret configured: everything is allowed.
/// 2. API paths (except the login endpoint): the `Authorization` token must match.
/// 3. A valid session cookie.
/// 4. A POST carrying a `password` field: accepted or rejected.
/// 5. Otherwise: the bare login challenge.
pub async fn authorize(request: Request, config: &AuthConfig, home: &str) -> AuthResult {
    let Some(secret) = config.secret.as_deref() else {
        return AuthResult::Allowed(request);
    };

    let path = request.uri().path().to_string();
    let is_api = path.starts_with(API_PREFIX);
    let is_api_login = path == API_LOGIN_PATH;

    if is_api && !is_api_login {
        if api_token_matches(request.headers(), config.api_token.as_deref()) {
            return AuthResult::Allowed(request);
        }
        tracing::warn!(path = %path, "API request rejected: missing or invalid token");
        return AuthResult::Denied(json_response(
            StatusCode::UNAUTHORIZED,
            "Authentication failed, a valid API token is required",
        ));
    }

    if session::parse_cookie(request.headers(), COOKIE_NAME)
        .is_some_and(|value| session::session_is_valid(&value, secret))
    {
        return AuthResult::Allowed(request);
    }

    if request.method() == Method::POST {
        if let Some(password) = extract_password(request).await {
            return if password == secret {
                tracing::info!("login accepted");
                login_success(secret, is_api_login, home)
            } else {
                tracing::warn!("login rejected: wrong password");
                AuthResult::Challenge(login_failure(is_api_login))
            };
        }
    }

    tracing::debug!(path = %path, "no credentials, sending login challenge");
    AuthResult::Challenge(login_challenge(is_api))
}

/// require_auth
///
/// Route-layer middleware wrapping every protected method router.
pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let home = state.config.home_path();
    match authorize(request, &state.config.auth, &home).await {
        AuthResult::Allowed(request) => next.run(request).await,
        AuthResult::Authenticated(response)
        | AuthResult::Challenge(response)
        | AuthResult::Denied(response) => response,
    }
}

/// api_token_matches
///
/// Accepts `Authorization: Bearer <token>` or the raw token. An unconfigured API token
/// never matches.
pub fn api_token_matches(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let token = provided
        .strip_prefix("Bearer ")
        .unwrap_or(provided)
        .trim();
    token == expected
}

/// extract_password
///
/// Reads the `password` field from a JSON body, or from a URL-encoded form for any other
/// content type. Returns `None` when the body has no password field at all.
async fn extract_password(request: Request) -> Option<String> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    let payload = if is_json {
        Json::<LoginPayload>::from_request(request, &())
            .await
            .map(|Json(payload)| payload)
            .ok()?
    } else {
        // Untyped bodies are read as `password=...` form data.
        let (mut parts, body) = request.into_parts();
        parts.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        Form::<LoginPayload>::from_request(Request::from_parts(parts, body), &())
            .await
            .map(|Form(payload)| payload)
            .ok()?
    };

    payload.password.map(|password| password.trim().to_string())
}

fn login_success(secret: &str, is_api_login: bool, home: &str) -> AuthResult {
    let token = match session::session_token_for(secret) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("failed to issue session token: {}", e);
            return AuthResult::Challenge(json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start a session",
            ));
        }
    };
    let cookie = (header::SET_COOKIE, session::session_cookie(&token));

    let response = if is_api_login {
        (
            StatusCode::OK,
            no_cache_headers(),
            [cookie],
            Json(SuccessResponse::ok()),
        )
            .into_response()
    } else {
        (
            StatusCode::FOUND,
            no_cache_headers(),
            [cookie, (header::LOCATION, location(home))],
        )
            .into_response()
    };
    AuthResult::Authenticated(response)
}

fn login_failure(is_api_login: bool) -> Response {
    if is_api_login {
        json_response(StatusCode::UNAUTHORIZED, "Incorrect password")
    } else {
        html_response(StatusCode::UNAUTHORIZED, views::login_page(true))
    }
}

fn login_challenge(is_api: bool) -> Response {
    if is_api {
        json_response(
            StatusCode::UNAUTHORIZED,
            "Authentication required, please provide valid credentials",
        )
    } else {
        html_response(StatusCode::UNAUTHORIZED, views::login_page(false))
    }
}

fn json_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    (status, no_cache_headers(), Json(body)).into_response()
}

fn html_response(status: StatusCode, body: String) -> Response {
    (status, no_cache_headers(), Html(body)).into_response()
}

/// Builds a `Location` header value, falling back to the site root for unusable paths.
pub fn location(path: &str) -> HeaderValue {
    HeaderValue::from_str(path).unwrap_or_else(|_| HeaderValue::from_static("/"))
}
