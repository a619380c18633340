//! Notification API endpoints.
//!
//! All routes operate on the acting user's own notifications only.

use axum::{
    extract::{Path, State},
    Extension,
};

use super::{error, success, ApiResult};
use crate::models::{Notification, User};
use crate::AppState;

/// GET /api/notifications - List the acting user's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Vec<Notification>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_notifications_for(&user).await {
        Ok(notifications) => success(notifications, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/notifications/:id/read - Mark one notification as read.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.mark_notification_read(&user, &id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/notifications/read-all - Mark all of the acting user's notifications as read.
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.mark_all_notifications_read(&user).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/notifications - Clear all of the acting user's notifications.
pub async fn clear_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.clear_notifications(&user).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
