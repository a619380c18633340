//! Commission rates API endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::commission::{CommissionRate, COMMISSION_RATES};
use crate::AppState;

/// GET /api/rates - The commission rate table.
///
/// Unauthenticated: the landing page shows the ranges before signup.
pub async fn get_rates(State(state): State<AppState>) -> ApiResult<Vec<CommissionRate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(COMMISSION_RATES.to_vec(), revision_id)
}
