use std::convert::Infallible;

use agroprice_core::{ApplicationError, InterfaceError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Per-request identifier carried on every log line and error body.
/// Taken from the `x-correlation-id` header when the caller supplies one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<CorrelationId>() {
            return Ok(existing.clone());
        }

        let id = parts
            .headers
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(CorrelationId::new)
            .unwrap_or_else(CorrelationId::generate);
        parts.extensions.insert(id.clone());
        Ok(id)
    }
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    /// Classifies an application failure and logs it against the request.
    pub fn from_application(
        event_name: &'static str,
        correlation_id: &CorrelationId,
        failure: ApplicationError,
    ) -> Self {
        let interface = failure.into_interface(correlation_id.as_str());
        match &interface {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::Validation { message, .. } => warn!(
                event_name,
                correlation_id = correlation_id.as_str(),
                detail = %message,
                "request rejected"
            ),
            InterfaceError::ServiceUnavailable { message, .. }
            | InterfaceError::Internal { message, .. } => error!(
                event_name,
                correlation_id = correlation_id.as_str(),
                detail = %message,
                "request failed"
            ),
        }
        Self(interface)
    }

    fn from_rejection(rejection: JsonRejection, correlation_id: &CorrelationId) -> Self {
        let message = rejection.body_text();
        let interface = match rejection {
            JsonRejection::JsonDataError(_) => InterfaceError::Validation {
                message,
                correlation_id: correlation_id.as_str().to_string(),
            },
            _ => InterfaceError::BadRequest {
                message,
                correlation_id: correlation_id.as_str().to_string(),
            },
        };
        warn!(
            event_name = "api.request.malformed",
            correlation_id = correlation_id.as_str(),
            detail = %interface.message(),
            "request body rejected"
        );
        Self(interface)
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors echo the precise detail; server-side failures only
    /// expose the fixed user-facing sentence.
    pub fn detail(&self) -> &str {
        match self.0 {
            InterfaceError::BadRequest { .. } | InterfaceError::Validation { .. } => {
                self.0.message()
            }
            InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. } => {
                self.0.user_message()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "detail": self.detail(),
            "correlation_id": self.0.correlation_id(),
        }));

        (self.status(), body).into_response()
    }
}

/// `Json` extractor whose rejections use the service error body.
/// Shape violations become 422, unreadable bodies 400.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id =
            req.extensions().get::<CorrelationId>().cloned().unwrap_or_else(CorrelationId::generate);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::from_rejection(rejection, &correlation_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use agroprice_core::{ApplicationError, DomainError, InterfaceError};
    use axum::http::StatusCode;

    use super::{ApiError, CorrelationId};

    #[test]
    fn domain_failures_surface_their_detail_as_bad_request() {
        let error = ApiError::from_application(
            "api.test.rejected",
            &CorrelationId::new("req-1"),
            ApplicationError::Domain(DomainError::invalid_input(
                "previous_price must be greater than 0",
            )),
        );

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.detail(), "previous_price must be greater than 0");
        assert_eq!(error.0.correlation_id(), "req-1");
    }

    #[test]
    fn collaborator_failures_hide_internal_detail() {
        let error = ApiError::from_application(
            "api.test.failed",
            &CorrelationId::new("req-2"),
            ApplicationError::Collaborator("disk full at /var/lib/feedback".to_string()),
        );

        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!error.detail().contains("disk full"));
        assert!(matches!(error.0, InterfaceError::ServiceUnavailable { .. }));
    }
}
