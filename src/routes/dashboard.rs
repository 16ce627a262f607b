use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Catalogue and scheduling counters")
    )
)]
#[axum::debug_handler]
pub async fn get_dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.dashboard_service.stats().await?;
    Ok(Json(stats))
}
