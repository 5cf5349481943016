//! API router with Swagger documentation

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    AppointmentService, AuthService, ClientService, Container, ContainerError, PetService,
};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    appointments, auth, clients, health, metrics, pets, request_id, users,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::get_current_user,
        auth::change_password,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::deactivate_user,
        clients::list_clients,
        clients::create_client,
        clients::get_client,
        clients::update_client,
        clients::delete_client,
        clients::list_client_pets,
        pets::list_pets,
        pets::search_pets,
        pets::create_pet,
        pets::get_pet,
        pets::update_pet,
        pets::deactivate_pet,
        pets::delete_pet,
        appointments::list_appointments,
        appointments::create_appointment,
        appointments::get_appointment,
        appointments::update_appointment,
        appointments::change_status,
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ComponentHealth,
            health::ContainerHealthDto,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ChangePasswordRequest,
            users::UserDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            clients::ClientDto,
            clients::ClientDetailDto,
            clients::CreateClientRequest,
            clients::UpdateClientRequest,
            pets::PetDto,
            pets::PetListItemDto,
            pets::PetDetailDto,
            pets::PetSearchResult,
            pets::CreatePetRequest,
            pets::UpdatePetRequest,
            appointments::AppointmentDto,
            appointments::CreateAppointmentRequest,
            appointments::UpdateAppointmentRequest,
            appointments::ChangeStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and dependency status"),
        (name = "Authentication", description = "Login (JWT), current user, password change"),
        (name = "Users", description = "Staff accounts and roles"),
        (name = "Clients", description = "Pet owners"),
        (name = "Pets", description = "Patients, owner lookup and quick search"),
        (name = "Appointments", description = "Scheduling, rescheduling and status lifecycle"),
    ),
    info(
        title = "VetCare API",
        version = "1.0.0",
        description = "REST API for veterinary clinic management",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the `/api/v1` handlers need; each handler state is carved out
/// of it through `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub auth: AuthState,
    pub auth_service: Arc<AuthService>,
    pub client_service: Arc<ClientService>,
    pub pet_service: Arc<PetService>,
    pub appointment_service: Arc<AppointmentService>,
}

impl ApiState {
    pub fn from_container(container: &Container) -> Result<Self, ContainerError> {
        let auth_service = container.auth_service()?;
        Ok(Self {
            auth: AuthState {
                jwt_config: auth_service.jwt_config().clone(),
            },
            auth_service,
            client_service: container.client_service()?,
            pet_service: container.pet_service()?,
            appointment_service: container.appointment_service()?,
        })
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<ApiState> for auth::AuthHandlerState {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            auth_service: state.auth_service.clone(),
        }
    }
}

impl FromRef<ApiState> for users::UserHandlerState {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            auth_service: state.auth_service.clone(),
        }
    }
}

impl FromRef<ApiState> for clients::ClientHandlerState {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            client_service: state.client_service.clone(),
            pet_service: state.pet_service.clone(),
        }
    }
}

impl FromRef<ApiState> for pets::PetHandlerState {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            pet_service: state.pet_service.clone(),
            appointment_service: state.appointment_service.clone(),
        }
    }
}

impl FromRef<ApiState> for appointments::AppointmentHandlerState {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            appointment_service: state.appointment_service.clone(),
        }
    }
}

/// Create the API router with all routes.
///
/// The container must already be initialized; services are resolved once
/// here and shared by every request.
pub fn create_api_router(
    container: Arc<Container>,
    db: DatabaseConnection,
    metrics_handle: Option<PrometheusHandle>,
) -> Result<Router, ContainerError> {
    let state = ApiState::from_container(&container)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new().route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        // Auth
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user).put(users::update_user))
        .route("/users/{id}/deactivate", post(users::deactivate_user))
        // Clients
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/{id}",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/clients/{id}/pets", get(clients::list_client_pets))
        // Pets
        .route("/pets", get(pets::list_pets).post(pets::create_pet))
        .route("/pets/search", get(pets::search_pets))
        .route(
            "/pets/{id}",
            get(pets::get_pet)
                .put(pets::update_pet)
                .delete(pets::delete_pet),
        )
        .route("/pets/{id}/deactivate", post(pets::deactivate_pet))
        // Appointments
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_appointment).put(appointments::update_appointment),
        )
        .route("/appointments/{id}/status", post(appointments::change_status))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes).with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db,
            container,
            started_at: Arc::new(Instant::now()),
        });

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1", api_routes);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    Ok(router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::Service;

    use crate::application::AuthSettings;
    use crate::domain::{RegisterUserDto, UserRole};
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
    use crate::infrastructure::database::test_database;

    struct TestApp {
        router: Router,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = test_database().await;
            let provider = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
            let container = Arc::new(Container::new(
                provider,
                AuthSettings {
                    bcrypt_cost: 4,
                    ..AuthSettings::default()
                },
            ));
            container.initialize();

            let auth = container.auth_service().unwrap();
            for (username, role) in [("admin", UserRole::Admin), ("frontdesk", UserRole::Receptionist)] {
                auth.register(RegisterUserDto {
                    username: username.into(),
                    email: format!("{}@vetcare.com", username),
                    password: "password123".into(),
                    role: Some(role),
                    first_name: "Test".into(),
                    last_name: "User".into(),
                })
                .await
                .unwrap();
            }

            let router = create_api_router(container, db, None).unwrap();
            Self { router }
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let mut svc = self.router.clone().into_service();
            let response = svc.call(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }

        async fn login(&self, username: &str) -> String {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/v1/auth/login",
                    None,
                    Some(json!({"username": username, "password": "password123"})),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{}", body);
            body["data"]["token"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn login_returns_bearer_token_and_user() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({"username": "admin", "password": "password123"})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn wrong_password_is_401() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({"username": "admin", "password": "wrong-password"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let app = TestApp::new().await;
        let (status, _) = app.send("GET", "/api/v1/clients", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .send("GET", "/api/v1/clients", Some("not-a-jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_returns_the_caller() {
        let app = TestApp::new().await;
        let token = app.login("frontdesk").await;
        let (status, body) = app.send("GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "frontdesk");
    }

    #[tokio::test]
    async fn creating_users_requires_admin() {
        let app = TestApp::new().await;
        let new_user = json!({
            "username": "drsmith",
            "email": "smith@vetcare.com",
            "password": "password123",
            "role": "veterinarian",
            "first_name": "John",
            "last_name": "Smith"
        });

        let token = app.login("frontdesk").await;
        let (status, _) = app
            .send("POST", "/api/v1/users", Some(&token), Some(new_user.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let token = app.login("admin").await;
        let (status, body) = app
            .send("POST", "/api/v1/users", Some(&token), Some(new_user))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["role"], "veterinarian");
    }

    #[tokio::test]
    async fn client_crud_flow() {
        let app = TestApp::new().await;
        let token = app.login("frontdesk").await;

        let (status, body) = app
            .send(
                "POST",
                "/api/v1/clients",
                Some(&token),
                Some(json!({"first_name": "Ana", "last_name": "Garcia", "email": "ana@example.com"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/clients",
                Some(&token),
                Some(json!({"first_name": "Other", "last_name": "Person", "email": "ana@example.com"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app
            .send(
                "PUT",
                &format!("/api/v1/clients/{}", id),
                Some(&token),
                Some(json!({"phone": "555-0101"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["phone"], "555-0101");

        let (status, body) = app
            .send("GET", "/api/v1/clients?search=garc", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let uri = format!("/api/v1/clients/{}", id);
        let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.send("GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_body_is_422() {
        let app = TestApp::new().await;
        let token = app.login("frontdesk").await;
        let (status, body) = app
            .send(
                "POST",
                "/api/v1/clients",
                Some(&token),
                Some(json!({"first_name": "", "last_name": "Garcia"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn pet_search_returns_bare_array() {
        let app = TestApp::new().await;
        let token = app.login("frontdesk").await;

        let (_, body) = app
            .send(
                "POST",
                "/api/v1/clients",
                Some(&token),
                Some(json!({"first_name": "Ana", "last_name": "Garcia"})),
            )
            .await;
        let client_id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = app
            .send(
                "POST",
                "/api/v1/pets",
                Some(&token),
                Some(json!({"name": "Rex", "species": "dog", "client_id": client_id})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app
            .send("GET", "/api/v1/pets/search?q=r", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = app
            .send("GET", "/api/v1/pets/search?q=re", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["display"], "Rex (Dog) - Ana Garcia");
    }

    #[tokio::test]
    async fn pet_search_caps_results_with_exact_match_first() {
        let app = TestApp::new().await;
        let token = app.login("frontdesk").await;

        let (_, body) = app
            .send(
                "POST",
                "/api/v1/clients",
                Some(&token),
                Some(json!({"first_name": "Ana", "last_name": "Garcia"})),
            )
            .await;
        let client_id = body["data"]["id"].as_i64().unwrap();

        let mut names: Vec<String> = (1..=6).map(|i| format!("Tomax {}", i)).collect();
        names.extend((1..=6).map(|i| format!("Maxi {}", i)));
        names.push("Max".to_string());
        for name in &names {
            let (status, _) = app
                .send(
                    "POST",
                    "/api/v1/pets",
                    Some(&token),
                    Some(json!({"name": name, "species": "cat", "client_id": client_id})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = app
            .send("GET", "/api/v1/pets/search?q=max", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 10);
        assert_eq!(results[0]["name"], "Max");
        assert_eq!(results[0]["display"], "Max (Cat) - Ana Garcia");
        assert!(results[1..7]
            .iter()
            .all(|r| r["name"].as_str().unwrap().starts_with("Maxi")));
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let (status, body) = app.send("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["container"]["initialized"], true);
    }

    #[test]
    fn openapi_lists_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/api/v1/pets/search"));
    }
}
