//! JSON API handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::analysis::detailed_feedback;
use crate::errors::AppError;
use crate::routes::pages::load_analysis;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub feedback: String,
}

/// GET /api/detailed-feedback/:id
///
/// Generates narrative feedback live from the stored résumé text.
/// Unknown ids answer `404 {"success": false, "error": ...}`.
pub async fn handle_detailed_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let analysis = load_analysis(&state, &id).await?;

    let feedback = detailed_feedback(
        state.llm.as_ref(),
        analysis.extracted_text.as_deref().unwrap_or_default(),
        &analysis.job_position,
    )
    .await;

    Ok(Json(FeedbackResponse {
        success: true,
        feedback,
    }))
}
