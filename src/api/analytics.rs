//! Analytics API endpoint.

use axum::{extract::State, Extension};
use chrono::{Datelike, Utc};

use super::{error, success, ApiResult};
use crate::analytics::{aggregate, AnalyticsSummary};
use crate::models::User;
use crate::AppState;

/// GET /api/analytics - Aggregate the acting user's visible leads for the
/// current year: monthly commission chart, product distribution, stat cards.
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<AnalyticsSummary> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_leads_for(&user).await {
        Ok(leads) => success(aggregate(&leads, Utc::now().year()), revision_id),
        Err(e) => error(e, revision_id),
    }
}
