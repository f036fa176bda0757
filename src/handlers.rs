use crate::{
    AppState,
    config::AppConfig,
    error::AppError,
    models::{
        Announcement, AnnouncementPage, AnnouncementPayload, CreatedResponse, ErrorResponse,
        LoginPayload, SuccessResponse,
    },
    repository::DeleteOutcome,
    session,
    views::{self, BoardView},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

// --- Query Structs ---

/// PageQuery
///
/// The `?page=N` parameter shared by the HTML views and the JSON listing. Kept as a raw
/// string so a malformed value degrades to page 1 instead of rejecting the request.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number. Only the leading digits count; none, or zero, means page 1.
    pub page: Option<String>,
}

impl PageQuery {
    /// Reads the leading digits of `page`, so `2abc` is page 2. Values too large for a
    /// `usize` saturate and are clamped to the last page by `paginate`; anything without
    /// leading digits, or zero, is page 1.
    pub fn page_number(&self) -> usize {
        let Some(raw) = self.page.as_deref() else {
            return 1;
        };
        let digits: &str = {
            let trimmed = raw.trim();
            let end = trimmed
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(trimmed.len());
            &trimmed[..end]
        };
        if digits.is_empty() {
            return 1;
        }
        digits.parse::<usize>().unwrap_or(usize::MAX).max(1)
    }
}

// --- HTML Views ---

/// list_page
///
/// [Guarded Route] The read-only announcement feed at the base path.
pub async fn list_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    render_board(&state, query.page_number(), false).await
}

/// admin_page
///
/// [Guarded Route] The feed plus create/edit/delete controls.
pub async fn admin_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Response {
    render_board(&state, query.page_number(), true).await
}

async fn render_board(state: &AppState, page: usize, admin: bool) -> Response {
    let listing = state
        .repo
        .list_announcements(page, state.config.page_size)
        .await;

    if let Some(message) = listing.error.as_deref() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(views::load_error_page(message, &state.config.base_path)),
        )
            .into_response();
    }

    let view = BoardView {
        title: if admin { "Announcement admin" } else { "Announcements" },
        base_path: &state.config.base_path,
        admin,
        api_token: state.config.auth.api_token.as_deref(),
    };
    Html(views::board_page(&view, &listing)).into_response()
}

/// logout
///
/// [Public Route] Clears the session cookie and sends the browser back to the list view.
/// Never checks credentials, so it always succeeds.
pub async fn logout(State(config): State<AppConfig>) -> Response {
    tracing::debug!("session cleared");
    (
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, session::cleared_session_cookie()),
            (header::LOCATION, crate::auth::location(&config.home_path())),
        ],
    )
        .into_response()
}

/// deny
///
/// The board's fallback: unmatched paths and unsupported methods get an empty 204.
pub async fn deny() -> StatusCode {
    StatusCode::NO_CONTENT
}

// --- JSON API ---

/// api_login
///
/// [Guarded Route] Reached only once the guard has let the request through (no secret
/// configured, or an already valid session). A password POST is answered by the guard itself.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "announcements",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = SuccessResponse),
        (status = 401, description = "Incorrect password", body = ErrorResponse)
    )
)]
pub async fn api_login() -> Json<SuccessResponse> {
    Json(SuccessResponse::ok())
}

/// list_announcements
///
/// [API Route] One page of announcements with pagination metadata.
#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "announcements",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of announcements", body = AnnouncementPage),
        (status = 401, description = "Missing or invalid API token", body = ErrorResponse),
        (status = 500, description = "Store could not be listed", body = ErrorResponse)
    )
)]
pub async fn list_announcements(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AnnouncementPage>, AppError> {
    let listing = state
        .repo
        .list_announcements(query.page_number(), state.config.page_size)
        .await;

    match listing.error {
        Some(message) => Err(AppError::Internal(message)),
        None => Ok(Json(listing)),
    }
}

/// get_announcement
///
/// [API Route] A single announcement by id.
#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = String, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Found", body = Announcement),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Announcement>, AppError> {
    state
        .repo
        .get_announcement(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
}

/// create_announcement
///
/// [API Route] Creates an announcement, keeping a caller-supplied id when it is free.
#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = "announcements",
    request_body = AnnouncementPayload,
    responses(
        (status = 200, description = "Created", body = CreatedResponse),
        (status = 400, description = "Invalid body or ID already taken", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API token", body = ErrorResponse)
    )
)]
pub async fn create_announcement(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, AppError> {
    let payload = parse_payload(&body)?;
    let announcement = state.repo.create_announcement(payload).await?;
    Ok(Json(CreatedResponse {
        success: true,
        id: announcement.id,
    }))
}

/// update_announcement
///
/// [API Route] Replaces title and content. A missing announcement is reported before the
/// body is looked at.
#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = String, Path, description = "Announcement ID")),
    request_body = AnnouncementPayload,
    responses(
        (status = 200, description = "Updated", body = SuccessResponse),
        (status = 400, description = "Invalid body or ID mismatch", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.repo.get_announcement(&id).await?.is_none() {
        return Err(AppError::NotFound("Announcement not found".to_string()));
    }
    let payload = parse_payload(&body)?;
    state.repo.update_announcement(&id, payload).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// delete_announcement
///
/// [API Route] Idempotent delete: a missing id still succeeds, with an explanatory message.
#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = String, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Deleted, or already absent", body = SuccessResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let response = match state.repo.delete_announcement(&id).await? {
        DeleteOutcome::Deleted => SuccessResponse::ok(),
        DeleteOutcome::Missing => {
            SuccessResponse::with_message("Announcement does not exist or was already deleted")
        }
    };
    Ok(Json(response))
}

fn parse_payload(body: &[u8]) -> Result<AnnouncementPayload, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("rejected announcement body: {}", e);
        AppError::InvalidJson
    })
}
