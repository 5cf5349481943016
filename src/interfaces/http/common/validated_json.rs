//! `ValidatedJson<T>`: `axum::Json<T>` followed by `validator::Validate`.
//!
//! Malformed bodies are rejected with 400; bodies that parse but fail
//! validation are rejected with 422 and one message per offending field.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct NewPet {
///     #[validate(length(min = 1, max = 50))]
///     name: String,
/// }
///
/// async fn create(ValidatedJson(body): ValidatedJson<NewPet>) { /* body is valid */ }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

/// `field: message` pairs ordered by field name
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(format!("Invalid JSON: {}", rejection))),
            )
                .into_response(),
            Self::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<()>::error(describe(&errors))),
            )
                .into_response(),
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;

        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct NewPet {
        #[validate(length(min = 1, max = 50, message = "name is required"))]
        name: String,
        #[validate(range(exclusive_min = 0.0, max = 500.0, message = "weight out of range"))]
        weight: f64,
    }

    async fn handler(ValidatedJson(pet): ValidatedJson<NewPet>) -> String {
        pet.name
    }

    async fn post_json(body: &str) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = Router::new().route("/pets", post(handler)).into_service();
        let req = Request::builder()
            .method("POST")
            .uri("/pets")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        svc.call(req).await.unwrap()
    }

    #[tokio::test]
    async fn valid_body_reaches_handler() {
        let resp = post_json(r#"{"name": "Rex", "weight": 12.5}"#).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let resp = post_json("{name: Rex").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_validation_is_422_with_field_messages() {
        let resp = post_json(r#"{"name": "", "weight": 0}"#).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["error"],
            "name: name is required; weight: weight out of range"
        );
    }
}
