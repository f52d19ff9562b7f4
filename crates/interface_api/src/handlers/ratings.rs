//! Rating handlers

use axum::{extract::State, Json};
use chrono::Utc;
use core_kernel::RatingId;
use tracing::info;
use validator::Validate;

use crate::dto::ratings::*;
use crate::{error::ApiError, AppState};

/// Rates a claim against the current table snapshot
pub async fn rate_claim(
    State(state): State<AppState>,
    Json(request): Json<RateClaimRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    request.validate()?;
    let rating_request = request.into_rating_request()?;

    // One snapshot for the whole request, even across a reload
    let tables = state.tables.snapshot();
    let result = state.engine.rate(tables.as_ref(), &rating_request)?;

    let rating_id = RatingId::new_v7();
    info!(
        rating_id = %rating_id,
        snapshot_id = %tables.id(),
        combined = %result.combined_percent(),
        "Claim rated"
    );

    Ok(Json(RatingResponse {
        rating_id,
        snapshot_id: tables.id(),
        rated_at: Utc::now(),
        result,
    }))
}
