use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::profile_dto::{
        CreateProfilePayload, ProfileListQuery, ProfileResponse, UpdateProfilePayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = CreateProfilePayload,
    responses(
        (status = 201, description = "Profile created", body = Json<ProfileResponse>),
        (status = 400, description = "Invalid payload or school membership"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state.profile_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("schoolId" = Option<Uuid>, Query, description = "Filter by school"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("search" = Option<String>, Query, description = "Search name and email")
    ),
    responses(
        (status = 200, description = "Page of profiles")
    )
)]
#[axum::debug_handler]
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.profile_service.list(query).await?;
    Ok(Json(page.map(ProfileResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    responses(
        (status = 200, description = "Profile found", body = Json<ProfileResponse>),
        (status = 404, description = "Profile not found")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service.get_by_id(id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<ProfileResponse>),
        (status = 400, description = "Invalid payload or school membership"),
        (status = 404, description = "Profile not found")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state.profile_service.update(id, payload).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 404, description = "Profile not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.profile_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
