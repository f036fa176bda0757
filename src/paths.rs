use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;

/// Where a raw request path lands relative to the configured base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathScope {
    /// The bare site root. Always answered with an empty 204.
    Root,
    /// Outside the board's base path. Answered with an empty 403.
    Foreign,
    /// Inside the board; carries the canonical path relative to the base ("/", "/admin", ...).
    Board(String),
}

/// scope_path
///
/// Classifies `path` against `base` (already normalised: lowercase, no trailing slash,
/// empty for a root mount). Matching is case-insensitive and tolerates one trailing slash.
pub fn scope_path(path: &str, base: &str) -> PathScope {
    if path.is_empty() || path == "/" {
        return PathScope::Root;
    }

    let trimmed = path.strip_suffix('/').unwrap_or(path);
    // ASCII lowercasing keeps byte offsets aligned with `trimmed`.
    let lower = trimmed.to_ascii_lowercase();

    if lower == base {
        return PathScope::Board("/".to_string());
    }

    match lower.strip_prefix(base) {
        Some(rest) if rest.starts_with('/') => {
            let relative = &trimmed[trimmed.len() - rest.len()..];
            PathScope::Board(canonical_board_path(relative))
        }
        _ => PathScope::Foreign,
    }
}

/// canonical_board_path
///
/// Lowercases the fixed route segments of a board-relative path while keeping the case
/// of an announcement id (`/API/Announcements/Abc` becomes `/api/announcements/Abc`).
pub fn canonical_board_path(relative: &str) -> String {
    let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

    let is_item_path = segments.len() >= 3
        && segments[0].eq_ignore_ascii_case("api")
        && segments[1].eq_ignore_ascii_case("announcements");

    let canonical: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            if is_item_path && index >= 2 {
                segment.to_string()
            } else {
                segment.to_ascii_lowercase()
            }
        })
        .collect();

    format!("/{}", canonical.join("/"))
}

/// scope_to_base_path
///
/// Outermost board middleware. Denies the root and foreign paths without a body, and
/// rewrites board paths to their canonical relative form before the inner router matches.
pub async fn scope_to_base_path(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match scope_path(request.uri().path(), &state.config.base_path) {
        PathScope::Root => StatusCode::NO_CONTENT.into_response(),
        PathScope::Foreign => StatusCode::FORBIDDEN.into_response(),
        PathScope::Board(relative) => {
            let rewritten = match request.uri().query() {
                Some(query) => format!("{}?{}", relative, query),
                None => relative,
            };
            match rewritten.parse::<Uri>() {
                Ok(uri) => {
                    *request.uri_mut() = uri;
                    next.run(request).await
                }
                Err(_) => StatusCode::NO_CONTENT.into_response(),
            }
        }
    }
}
