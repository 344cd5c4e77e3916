//! DELETE /api/v1/history - the "Delete Chat History" button.

use std::time::Instant;

use axum::extract::State;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Empty the conversation and persist the empty sequence.
pub async fn delete_history(
    State(state): State<AppState>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let mut session = state.session.lock().await;
    session.clear().await?;

    Ok(ApiResponse::timed(serde_json::json!({ "cleared": true }), start))
}
