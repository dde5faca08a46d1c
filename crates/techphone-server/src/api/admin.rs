use axum::{extract::State, Json};

use techphone_db::DashboardStats;

use super::{map_db_error, ApiError, ApiResponse, AppState};

/// `GET /api/admin/stats` — storefront-wide dashboard aggregates.
///
/// Serves the snapshot maintained by the refresh job; before the first
/// refresh lands the handler queries live so the endpoint never 500s on a
/// cold start.
pub(super) async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    if let Some(stats) = state.stats.read().await.clone() {
        return Ok(Json(ApiResponse::new(stats)));
    }

    let stats = techphone_db::dashboard_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let mut snapshot = state.stats.write().await;
    *snapshot = Some(stats.clone());
    drop(snapshot);

    Ok(Json(ApiResponse::new(stats)))
}
