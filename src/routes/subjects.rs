use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        chapter_dto::{ChapterListQuery, ChapterResponse, ReorderChaptersPayload},
        subject_dto::{
            CreateSubjectPayload, SubjectListQuery, SubjectResponse, SubjectTreeQuery,
            UpdateSubjectPayload,
        },
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectPayload,
    responses(
        (status = 201, description = "Subject created", body = Json<SubjectResponse>),
        (status = 400, description = "Invalid payload or parent"),
        (status = 409, description = "Code already taken")
    )
)]
#[axum::debug_handler]
pub async fn create_subject(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubjectPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let subject = state.subject_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(SubjectResponse::from(subject))))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("parentId" = Option<Uuid>, Query, description = "Filter by parent category"),
        ("isCategory" = Option<bool>, Query, description = "Only categories or only subjects"),
        ("isActive" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search code and names")
    ),
    responses(
        (status = 200, description = "Page of subjects")
    )
)]
#[axum::debug_handler]
pub async fn list_subjects(
    State(state): State<AppState>,
    Query(query): Query<SubjectListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.subject_service.list(query).await?;
    Ok(Json(page.map(SubjectResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/subjects/tree",
    params(
        ("includeInactive" = Option<bool>, Query, description = "Include inactive subjects")
    ),
    responses(
        (status = 200, description = "Categories with their subjects")
    )
)]
#[axum::debug_handler]
pub async fn subject_tree(
    State(state): State<AppState>,
    Query(query): Query<SubjectTreeQuery>,
) -> Result<impl IntoResponse> {
    let tree = state
        .subject_service
        .tree(query.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(tree))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(
        ("id" = Uuid, Path, description = "Subject ID")
    ),
    responses(
        (status = 200, description = "Subject found", body = Json<SubjectResponse>),
        (status = 404, description = "Subject not found")
    )
)]
#[axum::debug_handler]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let subject = state.subject_service.get_by_id(id).await?;
    Ok(Json(SubjectResponse::from(subject)))
}

#[utoipa::path(
    patch,
    path = "/api/subjects/{id}",
    params(
        ("id" = Uuid, Path, description = "Subject ID")
    ),
    request_body = UpdateSubjectPayload,
    responses(
        (status = 200, description = "Subject updated", body = Json<SubjectResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Change conflicts with existing children or chapters")
    )
)]
#[axum::debug_handler]
pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubjectPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let subject = state.subject_service.update(id, payload).await?;
    Ok(Json(SubjectResponse::from(subject)))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(
        ("id" = Uuid, Path, description = "Subject ID")
    ),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Subject still has children or chapters")
    )
)]
#[axum::debug_handler]
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.subject_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}/chapters",
    params(
        ("id" = Uuid, Path, description = "Subject ID"),
        ("isActive" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search chapter names")
    ),
    responses(
        (status = 200, description = "Chapters of the subject with question counts"),
        (status = 404, description = "Subject not found")
    )
)]
#[axum::debug_handler]
pub async fn list_subject_chapters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ChapterListQuery>,
) -> Result<impl IntoResponse> {
    state.subject_service.get_by_id(id).await?;
    let chapters = state.chapter_service.list_by_subject(id, query).await?;
    let items: Vec<ChapterResponse> = chapters.into_iter().map(ChapterResponse::from).collect();
    Ok(Json(items))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}/chapters/order",
    params(
        ("id" = Uuid, Path, description = "Subject ID")
    ),
    request_body = ReorderChaptersPayload,
    responses(
        (status = 200, description = "Chapters renumbered in the given order"),
        (status = 400, description = "Ids do not match the subject's chapters")
    )
)]
#[axum::debug_handler]
pub async fn reorder_chapters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderChaptersPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.subject_service.get_by_id(id).await?;
    let chapters = state
        .chapter_service
        .reorder(id, payload.chapter_ids)
        .await?;
    let items: Vec<ChapterResponse> = chapters.into_iter().map(ChapterResponse::from).collect();
    Ok(Json(items))
}
