use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::scheduled_exam_dto::{
        ChangeStatusPayload, CreateScheduledExamPayload, ScheduledExamListQuery,
        ScheduledExamResponse, UpdateScheduledExamPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/scheduled-exams",
    request_body = CreateScheduledExamPayload,
    responses(
        (status = 201, description = "Exam created", body = Json<ScheduledExamResponse>),
        (status = 400, description = "Missing fields or unknown structure")
    )
)]
#[axum::debug_handler]
pub async fn create_scheduled_exam(
    State(state): State<AppState>,
    Json(payload): Json<CreateScheduledExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let exam = state.scheduled_exam_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ScheduledExamResponse::from(exam))))
}

#[utoipa::path(
    get,
    path = "/api/scheduled-exams",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("subjectId" = Option<Uuid>, Query, description = "Filter by subject"),
        ("schoolId" = Option<Uuid>, Query, description = "Filter by school"),
        ("from" = Option<String>, Query, description = "Scheduled at or after (RFC 3339)"),
        ("to" = Option<String>, Query, description = "Scheduled at or before (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Page of scheduled exams")
    )
)]
#[axum::debug_handler]
pub async fn list_scheduled_exams(
    State(state): State<AppState>,
    Query(query): Query<ScheduledExamListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.scheduled_exam_service.list(query).await?;
    Ok(Json(page.map(ScheduledExamResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/scheduled-exams/{id}",
    params(
        ("id" = Uuid, Path, description = "Scheduled exam ID")
    ),
    responses(
        (status = 200, description = "Exam found", body = Json<ScheduledExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn get_scheduled_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.scheduled_exam_service.get_by_id(id).await?;
    Ok(Json(ScheduledExamResponse::from(exam)))
}

#[utoipa::path(
    patch,
    path = "/api/scheduled-exams/{id}",
    params(
        ("id" = Uuid, Path, description = "Scheduled exam ID")
    ),
    request_body = UpdateScheduledExamPayload,
    responses(
        (status = 200, description = "Exam updated", body = Json<ScheduledExamResponse>),
        (status = 404, description = "Exam not found"),
        (status = 409, description = "Exam is past the editable stage")
    )
)]
#[axum::debug_handler]
pub async fn update_scheduled_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduledExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let exam = state.scheduled_exam_service.update(id, payload).await?;
    Ok(Json(ScheduledExamResponse::from(exam)))
}

#[utoipa::path(
    delete,
    path = "/api/scheduled-exams/{id}",
    params(
        ("id" = Uuid, Path, description = "Scheduled exam ID")
    ),
    responses(
        (status = 204, description = "Exam deleted"),
        (status = 404, description = "Exam not found"),
        (status = 409, description = "Only draft or cancelled exams can be deleted")
    )
)]
#[axum::debug_handler]
pub async fn delete_scheduled_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.scheduled_exam_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/scheduled-exams/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Scheduled exam ID")
    ),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = Json<ScheduledExamResponse>),
        (status = 404, description = "Exam not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
#[axum::debug_handler]
pub async fn change_exam_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse> {
    let exam = state
        .scheduled_exam_service
        .change_status(id, payload.status)
        .await?;
    Ok(Json(ScheduledExamResponse::from(exam)))
}
