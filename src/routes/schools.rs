use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::school_dto::{CreateSchoolPayload, SchoolListQuery, SchoolResponse, UpdateSchoolPayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/schools",
    request_body = CreateSchoolPayload,
    responses(
        (status = 201, description = "School created", body = Json<SchoolResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "School code already taken")
    )
)]
#[axum::debug_handler]
pub async fn create_school(
    State(state): State<AppState>,
    Json(payload): Json<CreateSchoolPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let school = state.school_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(SchoolResponse::from(school))))
}

#[utoipa::path(
    get,
    path = "/api/schools",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("isActive" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search name, code and city")
    ),
    responses(
        (status = 200, description = "Page of schools")
    )
)]
#[axum::debug_handler]
pub async fn list_schools(
    State(state): State<AppState>,
    Query(query): Query<SchoolListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.school_service.list(query).await?;
    Ok(Json(page.map(SchoolResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School found", body = Json<SchoolResponse>),
        (status = 404, description = "School not found")
    )
)]
#[axum::debug_handler]
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let school = state.school_service.get_by_id(id).await?;
    Ok(Json(SchoolResponse::from(school)))
}

#[utoipa::path(
    patch,
    path = "/api/schools/{id}",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    request_body = UpdateSchoolPayload,
    responses(
        (status = 200, description = "School updated", body = Json<SchoolResponse>),
        (status = 404, description = "School not found")
    )
)]
#[axum::debug_handler]
pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSchoolPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let school = state.school_service.update(id, payload).await?;
    Ok(Json(SchoolResponse::from(school)))
}

#[utoipa::path(
    delete,
    path = "/api/schools/{id}",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    responses(
        (status = 204, description = "School deleted"),
        (status = 404, description = "School not found"),
        (status = 409, description = "Profiles or exams still reference the school")
    )
)]
#[axum::debug_handler]
pub async fn delete_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.school_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
