use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::AppState;
use crate::{error::AppResult, middleware::RequestId, models::MovieSummary};

/// Handler for the per-user recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    tracing::info!(%request_id, user_id = %user_id, "Recommendation request");

    let picks = state.recommender.recommend(&user_id).await?;

    tracing::info!(%request_id, count = picks.len(), "Recommendations served");
    Ok(Json(picks))
}
