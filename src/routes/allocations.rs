use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::allocation_dto::{AllocationPreviewPayload, AllocationResponse},
    error::Result,
    services::allocation_service::{AllocationService, ChapterCapacity},
    AppState,
};

/// Runs the allocator over caller-supplied availabilities without touching the database.
#[utoipa::path(
    post,
    path = "/api/allocations/preview",
    request_body = AllocationPreviewPayload,
    responses(
        (status = 200, description = "Per-chapter counts in input order", body = Json<AllocationResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn preview_allocation(
    State(_state): State<AppState>,
    Json(payload): Json<AllocationPreviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let capacities: Vec<ChapterCapacity<Uuid>> =
        payload.chapters.into_iter().map(Into::into).collect();
    let total = AllocationService::total_available(&capacities);
    let result = AllocationService::distribute(payload.required, &capacities);
    Ok(Json(AllocationResponse::new(payload.required, total, result)))
}
