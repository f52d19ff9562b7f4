//! Table snapshot handlers

use axum::{extract::State, Json};
use domain_rating::TableSummary;
use tracing::{info, warn};

use crate::dto::tables::ReloadResponse;
use crate::{error::ApiError, AppState};

/// Summary of the current snapshot
pub async fn get_tables(State(state): State<AppState>) -> Json<TableSummary> {
    Json(state.tables.snapshot().summary())
}

/// Reloads the tables from the configured directory and swaps them in
///
/// A failed load leaves the current snapshot in place.
pub async fn reload_tables(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let loader = state.config.table_loader();
    let tables = tokio::task::spawn_blocking(move || loader.load())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            warn!(error = %e, "Table reload failed");
            ApiError::from(e)
        })?;

    let current = tables.summary();
    let previous = state.tables.replace(tables);
    info!(
        previous = %previous.id(),
        current = %current.snapshot_id,
        "Reference tables swapped"
    );

    Ok(Json(ReloadResponse {
        previous_snapshot_id: previous.id(),
        current,
    }))
}
