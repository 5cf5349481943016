//! Appointment handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Utc};

use super::dto::{
    AppointmentDto, ChangeStatusRequest, CreateAppointmentRequest, ListAppointmentsParams,
    UpdateAppointmentRequest,
};
use crate::application::services::DEFAULT_DURATION_MINUTES;
use crate::application::AppointmentService;
use crate::domain::{
    AppointmentStatus, AppointmentType, CreateAppointmentDto, DomainError, UpdateAppointmentDto,
};
use crate::interfaces::http::common::{
    domain_error, not_found, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct AppointmentHandlerState {
    pub appointment_service: Arc<AppointmentService>,
}

fn parse_type(value: Option<String>) -> Result<Option<AppointmentType>, ApiError> {
    value.map(|v| v.parse()).transpose().map_err(domain_error)
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(ListAppointmentsParams),
    responses(
        (status = 200, description = "Matching appointments", body = ApiResponse<Vec<AppointmentDto>>),
        (status = 400, description = "Incomplete or inverted date range")
    )
)]
pub async fn list_appointments(
    State(state): State<AppointmentHandlerState>,
    Query(params): Query<ListAppointmentsParams>,
) -> ApiResult<Vec<AppointmentDto>> {
    let svc = &state.appointment_service;

    let appointments = if let Some(pet_id) = params.pet_id {
        svc.get_appointments_by_pet(pet_id).await
    } else if let Some(vet_id) = params.veterinarian_id {
        svc.get_appointments_by_veterinarian(vet_id).await
    } else {
        match (params.from, params.to) {
            (Some(from), Some(to)) => svc.get_appointments_between(from, to).await,
            (None, None) => {
                let start = Utc::now()
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .map(|d| d.and_utc())
                    .unwrap_or_else(Utc::now);
                svc.get_appointments_between(start, start + Duration::days(1))
                    .await
            }
            _ => Err(DomainError::Validation(
                "Both 'from' and 'to' are required for a date range".into(),
            )),
        }
    }
    .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(
        appointments.into_iter().map(AppointmentDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment scheduled", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Invalid duration, inactive pet or not a veterinarian"),
        (status = 404, description = "Pet or veterinarian not found"),
        (status = 409, description = "Veterinarian already booked")
    )
)]
pub async fn create_appointment(
    State(state): State<AppointmentHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentDto>>), ApiError> {
    let appointment_type = request
        .appointment_type
        .parse::<AppointmentType>()
        .map_err(domain_error)?;

    let dto = CreateAppointmentDto {
        pet_id: request.pet_id,
        veterinarian_id: request.veterinarian_id,
        created_by: Some(caller.user_id),
        appointment_date: request.appointment_date,
        duration_minutes: request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        appointment_type,
        reason: request.reason,
        notes: request.notes,
    };

    let appointment = state
        .appointment_service
        .create_appointment(dto)
        .await
        .map_err(domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AppointmentDto::from(appointment))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = ApiResponse<AppointmentDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_appointment(
    State(state): State<AppointmentHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<AppointmentDto> {
    match state.appointment_service.get_appointment_by_id(id).await {
        Ok(Some(appointment)) => Ok(Json(ApiResponse::success(AppointmentDto::from(
            appointment,
        )))),
        Ok(None) => Err(not_found("Appointment", id)),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<AppointmentDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Veterinarian already booked")
    )
)]
pub async fn update_appointment(
    State(state): State<AppointmentHandlerState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateAppointmentRequest>,
) -> ApiResult<AppointmentDto> {
    let dto = UpdateAppointmentDto {
        veterinarian_id: request.veterinarian_id,
        appointment_date: request.appointment_date,
        duration_minutes: request.duration_minutes,
        appointment_type: parse_type(request.appointment_type)?,
        reason: request.reason,
        notes: request.notes,
    };

    let appointment = state
        .appointment_service
        .update_appointment(id, dto)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/status",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<AppointmentDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn change_status(
    State(state): State<AppointmentHandlerState>,
    Path(id): Path<i32>,
    Json(request): Json<ChangeStatusRequest>,
) -> ApiResult<AppointmentDto> {
    let status = request
        .status
        .parse::<AppointmentStatus>()
        .map_err(domain_error)?;

    let appointment = state
        .appointment_service
        .change_status(id, status)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}
