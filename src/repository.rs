use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{Announcement, AnnouncementPage, AnnouncementPayload, Pagination},
    storage::StoreState,
};

/// Repository Trait
///
/// The announcement persistence contract used by the handlers. Implementations hide how
/// announcements map onto the key-value store.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Materialises every announcement, then returns one page of them. Never fails: a
    /// store-level failure is reported through `AnnouncementPage::error`.
    async fn list_announcements(&self, page: usize, page_size: usize) -> AnnouncementPage;

    async fn get_announcement(&self, id: &str) -> Result<Option<Announcement>, AppError>;

    async fn create_announcement(
        &self,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, AppError>;

    async fn update_announcement(
        &self,
        id: &str,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, AppError>;

    /// Idempotent: a missing id is reported as `DeleteOutcome::Missing`, never as an error.
    async fn delete_announcement(&self, id: &str) -> Result<DeleteOutcome, AppError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
}

/// KvRepository
///
/// The `Repository` implementation over a key-value store: one entry per announcement,
/// keyed by its id. `store` is `None` when no store is bound.
pub struct KvRepository {
    store: Option<StoreState>,
    list_limit: usize,
}

impl KvRepository {
    pub fn new(store: Option<StoreState>, list_limit: usize) -> Self {
        Self {
            store,
            list_limit: list_limit.max(1),
        }
    }

    fn store(&self) -> Result<&StoreState, AppError> {
        self.store.as_ref().ok_or_else(|| {
            tracing::error!("key-value store binding is not configured");
            AppError::StoreUnavailable("Key-value store is not available".to_string())
        })
    }

    async fn fetch_all(&self) -> Result<Vec<Announcement>, String> {
        let store = self.store().map_err(|e| e.to_string())?;
        let keys = store.list(self.list_limit).await.map_err(|e| {
            tracing::error!("list_announcements error: {:?}", e);
            "Unable to list announcements".to_string()
        })?;
        Ok(gather_best_effort(store, &keys).await)
    }
}

#[async_trait]
impl Repository for KvRepository {
    async fn list_announcements(&self, page: usize, page_size: usize) -> AnnouncementPage {
        match self.fetch_all().await {
            Ok(all) => {
                let (announcements, pagination) = paginate(all, page, page_size);
                AnnouncementPage {
                    announcements,
                    pagination,
                    error: None,
                }
            }
            Err(message) => AnnouncementPage::failed(message),
        }
    }

    async fn get_announcement(&self, id: &str) -> Result<Option<Announcement>, AppError> {
        let store = self.store()?;
        let value = store.get(id).await.map_err(|e| {
            tracing::error!("get_announcement error ({}): {:?}", id, e);
            AppError::store("Failed to fetch announcement", e)
        })?;

        match value {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                tracing::error!("announcement {} is not decodable: {:?}", id, e);
                AppError::store("Failed to fetch announcement", e.into())
            }),
            None => Ok(None),
        }
    }

    /// create_announcement
    ///
    /// Caller-supplied ids are collision-checked; generated `announcement_<millis>` ids are
    /// not, so two creates in the same millisecond overwrite each other.
    async fn create_announcement(
        &self,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, AppError> {
        let store = self.store()?;
        let (title, content) = validated_fields(&payload)?;

        let id = match payload.requested_id() {
            Some(id) => {
                let existing = store.get(&id).await.map_err(|e| {
                    tracing::error!("existence check failed ({}): {:?}", id, e);
                    AppError::store("Failed to check whether the ID exists", e)
                })?;
                if existing.is_some() {
                    return Err(AppError::Validation(format!(
                        "ID \"{}\" already exists, please use another ID",
                        id
                    )));
                }
                id
            }
            None => generate_id(),
        };

        let announcement = Announcement {
            id: id.clone(),
            title,
            content,
            created_at: Utc::now(),
            updated_at: None,
        };
        save(store, &announcement, "Failed to store announcement").await?;

        tracing::info!(
            id = %announcement.id,
            title = %announcement.title,
            content_length = announcement.content.len(),
            "announcement created"
        );
        Ok(announcement)
    }

    /// update_announcement
    ///
    /// Only title, content and `updatedAt` change; `id` and `createdAt` are carried over.
    async fn update_announcement(
        &self,
        id: &str,
        payload: AnnouncementPayload,
    ) -> Result<Announcement, AppError> {
        let store = self.store()?;
        let existing = self
            .get_announcement(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        let (title, content) = validated_fields(&payload)?;

        if payload.id_conflicts_with(id) {
            return Err(AppError::Validation(
                "ID mismatch, changing the ID is not allowed".to_string(),
            ));
        }

        let updated = Announcement {
            id: id.to_string(),
            title,
            content,
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
        };
        save(store, &updated, "Failed to update announcement").await?;

        tracing::info!(
            id = %updated.id,
            title = %updated.title,
            content_length = updated.content.len(),
            "announcement updated"
        );
        Ok(updated)
    }

    async fn delete_announcement(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        let store = self.store()?;
        let exists = store.get(id).await.map_err(|e| {
            tracing::error!("existence check failed ({}): {:?}", id, e);
            AppError::store("Failed to check whether the announcement exists", e)
        })?;

        if exists.is_none() {
            tracing::info!(id = %id, "delete requested for a missing announcement");
            return Ok(DeleteOutcome::Missing);
        }

        store.delete(id).await.map_err(|e| {
            tracing::error!("delete_announcement error ({}): {:?}", id, e);
            AppError::store("Failed to delete announcement", e)
        })?;

        tracing::info!(id = %id, "announcement deleted");
        Ok(DeleteOutcome::Deleted)
    }
}

/// gather_best_effort
///
/// Fetches every key concurrently and keeps the listing order. An item whose fetch fails,
/// whose key vanished, or whose value does not decode is dropped silently; only a failure
/// of the listing itself (handled by the caller) aborts a listing.
pub async fn gather_best_effort(store: &StoreState, keys: &[String]) -> Vec<Announcement> {
    let fetches = keys.iter().map(|key| async move {
        match store.get(key).await {
            Ok(Some(value)) => serde_json::from_value::<Announcement>(value).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("skipping {} during listing: {}", key, e);
                None
            }
        }
    });

    join_all(fetches).await.into_iter().flatten().collect()
}

/// paginate
///
/// `totalPages = max(1, ceil(totalItems / pageSize))`; the requested page is clamped into
/// `[1, totalPages]` and the slice `[(page-1)*pageSize, page*pageSize)` is returned.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> (Vec<T>, Pagination) {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let current_page = page.clamp(1, total_pages);

    let start = (current_page - 1) * page_size;
    let slice = items.into_iter().skip(start).take(page_size).collect();

    (
        slice,
        Pagination {
            current_page,
            total_pages,
            total_items,
        },
    )
}

/// System-generated ids are timestamp based and deliberately not collision-checked.
pub fn generate_id() -> String {
    format!("announcement_{}", Utc::now().timestamp_millis())
}

fn validated_fields(payload: &AnnouncementPayload) -> Result<(String, String), AppError> {
    let title = payload.title.as_deref().map(str::trim).unwrap_or("");
    let content = payload.content.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() || content.is_empty() {
        return Err(AppError::Validation(
            "Title and content must not be empty".to_string(),
        ));
    }
    Ok((title.to_string(), content.to_string()))
}

async fn save(
    store: &StoreState,
    announcement: &Announcement,
    context: &str,
) -> Result<(), AppError> {
    let value = serde_json::to_value(announcement)
        .map_err(|e| AppError::store(context, e.into()))?;
    store.put(&announcement.id, &value).await.map_err(|e| {
        tracing::error!("{} ({}): {:?}", context, announcement.id, e);
        AppError::store(context, e)
    })
}
