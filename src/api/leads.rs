//! Lead API endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateLeadRequest, Lead, UpdateLeadRequest, User};
use crate::AppState;

/// GET /api/leads - List the leads visible to the acting user.
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Vec<Lead>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_leads_for(&user).await {
        Ok(leads) => success(leads, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/leads/:id - Get a single lead within the acting user's visibility.
pub async fn get_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<Lead> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_lead_for(&user, &id).await {
        Ok(Some(lead)) => success(lead, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Lead {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/leads - Register a new lead owned by the acting user.
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateLeadRequest>,
) -> ApiResult<Lead> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.create_lead(&user, &request).await {
        Ok(lead) => {
            tracing::info!("Lead {} created by partner {}", lead.id, user.id);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(lead, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/leads/:id - Update a lead.
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(request): Json<UpdateLeadRequest>,
) -> ApiResult<Lead> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.update_lead(&user, &id, &request).await {
        Ok(lead) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(lead, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/leads/:id - Delete a lead permanently.
///
/// Destructive and non-reversible; the dashboard asks the user to confirm
/// before calling this.
pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_lead(&user, &id).await {
        Ok(()) => {
            tracing::info!("Lead {} deleted by {}", id, user.id);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
