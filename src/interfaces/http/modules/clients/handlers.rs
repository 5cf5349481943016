//! Client handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    ClientDetailDto, ClientDto, ClientPetsParams, CreateClientRequest, ListClientsParams,
    UpdateClientRequest,
};
use crate::application::{ClientService, PetService};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::modules::pets::PetDto;

#[derive(Clone)]
pub struct ClientHandlerState {
    pub client_service: Arc<ClientService>,
    pub pet_service: Arc<PetService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "Clients",
    security(("bearer_auth" = [])),
    params(ListClientsParams),
    responses(
        (status = 200, description = "Clients ordered by name", body = ApiResponse<Vec<ClientDto>>)
    )
)]
pub async fn list_clients(
    State(state): State<ClientHandlerState>,
    Query(params): Query<ListClientsParams>,
) -> ApiResult<Vec<ClientDto>> {
    let clients = match params.search.as_deref() {
        Some(query) => state.client_service.search_clients(query).await,
        None => state.client_service.get_all_clients().await,
    }
    .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(
        clients.into_iter().map(ClientDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "Clients",
    security(("bearer_auth" = [])),
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ApiResponse<ClientDto>),
        (status = 409, description = "Email or identification number taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_client(
    State(state): State<ClientHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientDto>>), ApiError> {
    let client = state
        .client_service
        .create_client(request.into())
        .await
        .map_err(domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ClientDto::from(client))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client with pet counts", body = ApiResponse<ClientDetailDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_client(
    State(state): State<ClientHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<ClientDetailDto> {
    let summary = state
        .client_service
        .get_client_summary(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(ClientDetailDto::from(summary))))
}

#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ApiResponse<ClientDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Email or identification number taken")
    )
)]
pub async fn update_client(
    State(state): State<ClientHandlerState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateClientRequest>,
) -> ApiResult<ClientDto> {
    let client = state
        .client_service
        .update_client(id, request.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(ClientDto::from(client))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deleted with its pets and appointments"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_client(
    State(state): State<ClientHandlerState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .client_service
        .delete_client(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/pets",
    tag = "Clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID"), ClientPetsParams),
    responses(
        (status = 200, description = "Pets of the client", body = ApiResponse<Vec<PetDto>>),
        (status = 404, description = "Client not found")
    )
)]
pub async fn list_client_pets(
    State(state): State<ClientHandlerState>,
    Path(id): Path<i32>,
    Query(params): Query<ClientPetsParams>,
) -> ApiResult<Vec<PetDto>> {
    let pets = state
        .pet_service
        .get_pets_by_client(id, !params.show_inactive)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(
        pets.into_iter().map(PetDto::from).collect(),
    )))
}
