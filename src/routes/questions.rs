use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::question_dto::{
        BulkCreateQuestionsPayload, BulkCreateResponse, CreateQuestionPayload, QuestionListQuery,
        QuestionResponse, UpdateQuestionPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/questions",
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question created", body = Json<QuestionResponse>),
        (status = 400, description = "Invalid payload or answer data")
    )
)]
#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

#[utoipa::path(
    post,
    path = "/api/questions/bulk",
    request_body = BulkCreateQuestionsPayload,
    responses(
        (status = 201, description = "All questions created", body = Json<BulkCreateResponse>),
        (status = 400, description = "At least one question is invalid; nothing was stored")
    )
)]
#[axum::debug_handler]
pub async fn bulk_create_questions(
    State(state): State<AppState>,
    Json(payload): Json<BulkCreateQuestionsPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created = state
        .question_service
        .bulk_create(payload.questions)
        .await?;
    let items: Vec<QuestionResponse> = created.into_iter().map(QuestionResponse::from).collect();
    Ok((
        StatusCode::CREATED,
        Json(BulkCreateResponse {
            created: items.len(),
            items,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/questions",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("chapterId" = Option<Uuid>, Query, description = "Filter by chapter"),
        ("subjectId" = Option<Uuid>, Query, description = "Filter by subject"),
        ("questionType" = Option<String>, Query, description = "Filter by question type"),
        ("difficulty" = Option<String>, Query, description = "Filter by difficulty"),
        ("isActive" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search question text")
    ),
    responses(
        (status = 200, description = "Page of questions")
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.question_service.list(query).await?;
    Ok(Json(page.map(QuestionResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question ID")
    ),
    responses(
        (status = 200, description = "Question found", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_by_id(id).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    patch,
    path = "/api/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question ID")
    ),
    request_body = UpdateQuestionPayload,
    responses(
        (status = 200, description = "Question updated", body = Json<QuestionResponse>),
        (status = 400, description = "Invalid payload or answer data"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.update(id, payload).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question ID")
    ),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.question_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
