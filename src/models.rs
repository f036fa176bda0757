use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// --- Stored Records ---

/// Announcement
///
/// A single board entry. Stored as one key-value entry keyed by `id`; the JSON field
/// names (`createdAt`, `updatedAt`) are the on-store format and the API format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    // Absent until the first edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Request Payloads ---

/// AnnouncementPayload
///
/// Body accepted by `POST /api/announcements` and `PUT /api/announcements/{id}`.
/// Every field is optional at the parsing stage so validation can produce the
/// board's own error messages instead of a deserializer rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementPayload {
    /// Optional caller-chosen id. Only a non-empty string counts as supplied.
    #[schema(value_type = Option<String>)]
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl AnnouncementPayload {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            id: None,
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(Value::String(id.to_string()));
        self
    }

    /// The caller-supplied id, trimmed. Non-string and blank ids are treated as absent.
    pub fn requested_id(&self) -> Option<String> {
        match &self.id {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
            _ => None,
        }
    }

    /// True when the body names an id other than `path_id`. Null and blank ids name nothing.
    pub fn id_conflicts_with(&self, path_id: &str) -> bool {
        match &self.id {
            None | Some(Value::Null) => false,
            Some(Value::String(id)) if id.is_empty() => false,
            Some(Value::String(id)) => id != path_id,
            Some(_) => true,
        }
    }
}

/// LoginPayload
///
/// The password field of a login form or JSON login body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    pub password: Option<String>,
}

// --- Listing Schemas ---

/// Pagination
///
/// Derived per request from the full in-memory announcement list; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

/// AnnouncementPage
///
/// Result of a listing. `error` is set when the store could not be listed at all; callers
/// must check it before treating an empty `announcements` as "nothing posted yet".
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementPage {
    pub announcements: Vec<Announcement>,
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnnouncementPage {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            announcements: Vec::new(),
            pagination: Pagination::default(),
            error: Some(message.into()),
        }
    }
}

// --- Response Schemas ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// ErrorResponse
///
/// The single error shape used by every JSON route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
