//! Datastore API endpoints.

use axum::{extract::State, Extension};

use super::{success, ApiResult};
use crate::models::{Datastore, RevisionInfo, User};
use crate::AppState;

/// GET /api/datastore - Bootstrap snapshot for the acting user.
pub async fn get_datastore(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Datastore> {
    let datastore = state
        .repo
        .get_datastore(&user)
        .await
        .map_err(|e| crate::errors::AppErrorWithRevision {
            error: e,
            revision_id: 0,
        })?;

    let revision_id = datastore.revision_id;
    success(datastore, revision_id)
}

/// GET /api/datastore/revision - Get the current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let revision_info =
        state
            .repo
            .get_revision_info()
            .await
            .map_err(|e| crate::errors::AppErrorWithRevision {
                error: e,
                revision_id: 0,
            })?;

    success(revision_info.clone(), revision_info.revision_id)
}
