//! Staff account handlers
//!
//! Reads are open to any signed-in user; writes require the admin role.
//! Delegates to `AuthService`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateUserRequest, ListUsersParams, UpdateUserRequest, UserDto};
use crate::application::AuthService;
use crate::domain::{RegisterUserDto, UpdateUserDto, UserRole};
use crate::interfaces::http::common::{
    domain_error, not_found, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct UserHandlerState {
    pub auth_service: Arc<AuthService>,
}

fn parse_role(role: Option<String>) -> Result<Option<UserRole>, ApiError> {
    role.map(|r| r.parse::<UserRole>())
        .transpose()
        .map_err(domain_error)
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<Vec<UserDto>> {
    let role = parse_role(params.role)?;
    let users = state
        .auth_service
        .list_users(!params.include_inactive)
        .await
        .map_err(domain_error)?;

    let items = users
        .into_iter()
        .filter(|u| role.map_or(true, |r| u.role == r))
        .map(UserDto::from)
        .collect();
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<UserDto> {
    match state.auth_service.get_user_by_id(id).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::success(UserDto::from(user)))),
        Ok(None) => Err(not_found("User", id)),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Username or email taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    caller.require_admin()?;

    let dto = RegisterUserDto {
        username: request.username,
        email: request.email,
        password: request.password,
        role: parse_role(request.role)?,
        first_name: request.first_name,
        last_name: request.last_name,
    };

    let user = state.auth_service.register(dto).await.map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserDto> {
    caller.require_admin()?;

    let dto = UpdateUserDto {
        email: request.email,
        role: parse_role(request.role)?,
        first_name: request.first_name,
        last_name: request.last_name,
        is_active: request.is_active,
    };

    let user = state
        .auth_service
        .update_user(id, dto)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/deactivate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    caller.require_admin()?;

    if caller.user_id == id {
        return Err(domain_error(crate::domain::DomainError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    state
        .auth_service
        .deactivate_user(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
