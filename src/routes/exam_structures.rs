use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common_dto::Page,
        exam_structure_dto::{
            CreateExamStructurePayload, DrawnPaperResponse, ExamStructureListQuery,
            ExamStructureResponse, UpdateExamStructurePayload,
        },
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/exam-structures",
    request_body = CreateExamStructurePayload,
    responses(
        (status = 201, description = "Exam structure created", body = Json<ExamStructureResponse>),
        (status = 400, description = "Invalid section, sourcing or subject")
    )
)]
#[axum::debug_handler]
pub async fn create_exam_structure(
    State(state): State<AppState>,
    Json(payload): Json<CreateExamStructurePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let structure = state.exam_structure_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ExamStructureResponse::try_from(structure)?),
    ))
}

#[utoipa::path(
    get,
    path = "/api/exam-structures",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("subjectId" = Option<Uuid>, Query, description = "Filter by subject"),
        ("classLevel" = Option<i32>, Query, description = "Filter by class level"),
        ("isActive" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Page of exam structures")
    )
)]
#[axum::debug_handler]
pub async fn list_exam_structures(
    State(state): State<AppState>,
    Query(query): Query<ExamStructureListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.exam_structure_service.list(query).await?;
    let items = page
        .items
        .into_iter()
        .map(ExamStructureResponse::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(Page {
        items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages,
    }))
}

#[utoipa::path(
    get,
    path = "/api/exam-structures/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam structure ID")
    ),
    responses(
        (status = 200, description = "Exam structure found", body = Json<ExamStructureResponse>),
        (status = 404, description = "Exam structure not found")
    )
)]
#[axum::debug_handler]
pub async fn get_exam_structure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let structure = state.exam_structure_service.get_by_id(id).await?;
    Ok(Json(ExamStructureResponse::try_from(structure)?))
}

#[utoipa::path(
    patch,
    path = "/api/exam-structures/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam structure ID")
    ),
    request_body = UpdateExamStructurePayload,
    responses(
        (status = 200, description = "Exam structure updated", body = Json<ExamStructureResponse>),
        (status = 400, description = "Invalid section or sourcing"),
        (status = 404, description = "Exam structure not found")
    )
)]
#[axum::debug_handler]
pub async fn update_exam_structure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExamStructurePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let structure = state.exam_structure_service.update(id, payload).await?;
    Ok(Json(ExamStructureResponse::try_from(structure)?))
}

#[utoipa::path(
    delete,
    path = "/api/exam-structures/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam structure ID")
    ),
    responses(
        (status = 204, description = "Exam structure deleted"),
        (status = 404, description = "Exam structure not found"),
        (status = 409, description = "Scheduled exams still use the structure")
    )
)]
#[axum::debug_handler]
pub async fn delete_exam_structure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.exam_structure_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/exam-structures/{id}/duplicate",
    params(
        ("id" = Uuid, Path, description = "Exam structure ID")
    ),
    responses(
        (status = 201, description = "Copy created", body = Json<ExamStructureResponse>),
        (status = 404, description = "Exam structure not found")
    )
)]
#[axum::debug_handler]
pub async fn duplicate_exam_structure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let copy = state.exam_structure_service.duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(ExamStructureResponse::try_from(copy)?)))
}

#[utoipa::path(
    get,
    path = "/api/exam-structures/{id}/draw",
    params(
        ("id" = Uuid, Path, description = "Exam structure ID")
    ),
    responses(
        (status = 200, description = "Randomly drawn question paper", body = Json<DrawnPaperResponse>),
        (status = 404, description = "Exam structure not found")
    )
)]
#[axum::debug_handler]
pub async fn draw_paper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let paper = state.exam_structure_service.draw(id).await?;
    Ok(Json(paper))
}
