//! Authentication handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::dto::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::application::AuthService;
use crate::interfaces::http::common::{
    domain_error, not_found, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::users::UserDto;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub auth_service: Arc<AuthService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials, disabled or locked account")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let result = state
        .auth_service
        .authenticate(request.username.trim(), &request.password)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        token_type: result.token_type,
        expires_in: result.expires_in,
        user: UserDto::from(result.user),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<UserDto> {
    match state.auth_service.get_user_by_id(caller.user_id).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::success(UserDto::from(user)))),
        Ok(None) => Err(not_found("User", caller.user_id)),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .auth_service
        .change_password(
            caller.user_id,
            &request.current_password,
            &request.new_password,
        )
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}
