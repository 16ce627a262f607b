use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        allocation_dto::{AllocationResponse, AutoDistributePayload},
        chapter_dto::{ChapterResponse, CreateChapterPayload, UpdateChapterPayload},
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/chapters",
    request_body = CreateChapterPayload,
    responses(
        (status = 201, description = "Chapter created", body = Json<ChapterResponse>),
        (status = 400, description = "Invalid payload or subject"),
        (status = 409, description = "Chapter number already used in the subject")
    )
)]
#[axum::debug_handler]
pub async fn create_chapter(
    State(state): State<AppState>,
    Json(payload): Json<CreateChapterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let chapter = state.chapter_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ChapterResponse::from(chapter))))
}

#[utoipa::path(
    get,
    path = "/api/chapters/{id}",
    params(
        ("id" = Uuid, Path, description = "Chapter ID")
    ),
    responses(
        (status = 200, description = "Chapter with question counts", body = Json<ChapterResponse>),
        (status = 404, description = "Chapter not found")
    )
)]
#[axum::debug_handler]
pub async fn get_chapter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let chapter = state.chapter_service.get_by_id(id).await?;
    Ok(Json(ChapterResponse::from(chapter)))
}

#[utoipa::path(
    patch,
    path = "/api/chapters/{id}",
    params(
        ("id" = Uuid, Path, description = "Chapter ID")
    ),
    request_body = UpdateChapterPayload,
    responses(
        (status = 200, description = "Chapter updated", body = Json<ChapterResponse>),
        (status = 404, description = "Chapter not found"),
        (status = 409, description = "Chapter number already used in the subject")
    )
)]
#[axum::debug_handler]
pub async fn update_chapter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateChapterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let chapter = state.chapter_service.update(id, payload).await?;
    Ok(Json(ChapterResponse::from(chapter)))
}

#[utoipa::path(
    delete,
    path = "/api/chapters/{id}",
    params(
        ("id" = Uuid, Path, description = "Chapter ID")
    ),
    responses(
        (status = 204, description = "Chapter deleted"),
        (status = 404, description = "Chapter not found"),
        (status = 409, description = "Chapter still has questions")
    )
)]
#[axum::debug_handler]
pub async fn delete_chapter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.chapter_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/chapters/auto-distribute",
    request_body = AutoDistributePayload,
    responses(
        (status = 200, description = "Allocation over the chapters' stored questions", body = Json<AllocationResponse>),
        (status = 400, description = "Unknown or repeated chapter")
    )
)]
#[axum::debug_handler]
pub async fn auto_distribute(
    State(state): State<AppState>,
    Json(payload): Json<AutoDistributePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let allocation = state.chapter_service.auto_distribute(payload).await?;
    Ok(Json(allocation))
}
