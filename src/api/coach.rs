//! Coach API endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::coach::ChatTurn;
use crate::errors::AppError;
use crate::AppState;

/// Request body for a coach message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachMessageRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Response body carrying the model's reply.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachMessageResponse {
    pub reply: String,
}

/// POST /api/coach/message - Forward a message to the Coach Énergie upstream.
pub async fn coach_message(
    State(state): State<AppState>,
    Json(request): Json<CoachMessageRequest>,
) -> ApiResult<CoachMessageResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.message.trim().is_empty() {
        return error(
            AppError::Validation("Message is required".to_string()),
            revision_id,
        );
    }

    match state.coach.send_message(&request.message, &request.history).await {
        Ok(reply) => success(CoachMessageResponse { reply }, revision_id),
        Err(e) => error(e, revision_id),
    }
}
