//! Pet handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreatePetRequest, ListPetsParams, PetDetailDto, PetDto, PetListItemDto, PetSearchParams,
    PetSearchResult, UpdatePetRequest,
};
use crate::application::{AppointmentService, PetService};
use crate::domain::{CreatePetDto, PetGender, PetSpecies, UpdatePetDto};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::modules::appointments::AppointmentDto;
use crate::interfaces::http::modules::clients::ClientDto;

const SEARCH_MIN_CHARS: usize = 2;
const SEARCH_MAX_RESULTS: usize = 10;
const RECENT_APPOINTMENTS: usize = 5;

#[derive(Clone)]
pub struct PetHandlerState {
    pub pet_service: Arc<PetService>,
    pub appointment_service: Arc<AppointmentService>,
}

fn parse_species(value: Option<String>) -> Result<Option<PetSpecies>, ApiError> {
    value.map(|v| v.parse()).transpose().map_err(domain_error)
}

fn parse_gender(value: Option<String>) -> Result<Option<PetGender>, ApiError> {
    value.map(|v| v.parse()).transpose().map_err(domain_error)
}

#[utoipa::path(
    get,
    path = "/api/v1/pets",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(ListPetsParams),
    responses(
        (status = 200, description = "Pets with owner names", body = ApiResponse<Vec<PetListItemDto>>)
    )
)]
pub async fn list_pets(
    State(state): State<PetHandlerState>,
    Query(params): Query<ListPetsParams>,
) -> ApiResult<Vec<PetListItemDto>> {
    let search = params.search.as_deref().map(str::trim).unwrap_or_default();

    let pets = if search.is_empty() {
        state
            .pet_service
            .get_pets_with_owners(!params.show_inactive)
            .await
    } else {
        state
            .pet_service
            .search_pets_with_owners(search, usize::MAX)
            .await
    }
    .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(
        pets.into_iter().map(PetListItemDto::from).collect(),
    )))
}

/// Autocomplete; always answers with a bare JSON array
#[utoipa::path(
    get,
    path = "/api/v1/pets/search",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(PetSearchParams),
    responses(
        (status = 200, description = "Up to ten ranked matches", body = Vec<PetSearchResult>)
    )
)]
pub async fn search_pets(
    State(state): State<PetHandlerState>,
    Query(params): Query<PetSearchParams>,
) -> Result<Json<Vec<PetSearchResult>>, ApiError> {
    let query = params.q.trim();
    if query.chars().count() < SEARCH_MIN_CHARS {
        return Ok(Json(Vec::new()));
    }

    let matches = state
        .pet_service
        .search_pets_with_owners(query, SEARCH_MAX_RESULTS)
        .await
        .map_err(domain_error)?;

    Ok(Json(
        matches.into_iter().map(PetSearchResult::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/pets",
    tag = "Pets",
    security(("bearer_auth" = [])),
    request_body = CreatePetRequest,
    responses(
        (status = 201, description = "Pet registered", body = ApiResponse<PetDto>),
        (status = 400, description = "Invalid species, gender, weight or birth date"),
        (status = 404, description = "Owner not found"),
        (status = 409, description = "Microchip already registered")
    )
)]
pub async fn create_pet(
    State(state): State<PetHandlerState>,
    ValidatedJson(request): ValidatedJson<CreatePetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PetDto>>), ApiError> {
    let dto = CreatePetDto {
        name: request.name,
        species: parse_species(request.species)?.unwrap_or_default(),
        breed: request.breed,
        birth_date: request.birth_date,
        gender: parse_gender(request.gender)?.unwrap_or_default(),
        color: request.color,
        weight: request.weight,
        microchip_number: request.microchip_number,
        client_id: request.client_id,
    };

    let pet = state
        .pet_service
        .create_pet(dto)
        .await
        .map_err(domain_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(PetDto::from(pet)))))
}

#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet with owner and recent appointments", body = ApiResponse<PetDetailDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_pet(
    State(state): State<PetHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<PetDetailDto> {
    let summary = state
        .pet_service
        .get_pet_summary(id)
        .await
        .map_err(domain_error)?;

    let recent = state
        .appointment_service
        .get_appointments_by_pet(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PetDetailDto {
        pet: PetDto::from(summary.pet),
        owner: summary.owner.map(ClientDto::from),
        age_years: summary.age_years,
        recent_appointments: recent
            .into_iter()
            .take(RECENT_APPOINTMENTS)
            .map(AppointmentDto::from)
            .collect(),
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pet ID")),
    request_body = UpdatePetRequest,
    responses(
        (status = 200, description = "Pet updated", body = ApiResponse<PetDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_pet(
    State(state): State<PetHandlerState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdatePetRequest>,
) -> ApiResult<PetDto> {
    let dto = UpdatePetDto {
        name: request.name,
        species: parse_species(request.species)?,
        breed: request.breed,
        birth_date: request.birth_date,
        gender: parse_gender(request.gender)?,
        color: request.color,
        weight: request.weight,
        microchip_number: request.microchip_number,
        is_active: request.is_active,
    };

    let pet = state
        .pet_service
        .update_pet(id, dto)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(PetDto::from(pet))))
}

#[utoipa::path(
    post,
    path = "/api/v1/pets/{id}/deactivate",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet deactivated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn deactivate_pet(
    State(state): State<PetHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .pet_service
        .deactivate_pet(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pets/{id}",
    tag = "Pets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet and its appointments deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_pet(
    State(state): State<PetHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .pet_service
        .delete_pet(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}
