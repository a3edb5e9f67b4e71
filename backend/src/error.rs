use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Body text returned for every unhandled fault.
pub const GENERIC_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum AppError {
    /// A required input was null or malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The resource does not exist. The value is echoed back as the body.
    #[error("not found: {0}")]
    NotFound(serde_json::Value),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Cause of a 500 response, attached as a response extension.
///
/// The exception guard removes it and logs it together with the request
/// body, so the message never leaves the process.
#[derive(Debug, Clone)]
pub struct Fault(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::NotFound(value) => (StatusCode::NOT_FOUND, Json(value)).into_response(),
            AppError::Internal(err) => {
                let mut response = internal_error_response();
                response.extensions_mut().insert(Fault(format!("{err:#}")));
                response
            }
        }
    }
}

pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": GENERIC_ERROR })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn bad_request_maps_to_400_with_message() {
        let response = AppError::BadRequest("payload must not be null".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<Fault>().is_none());
        assert!(body_string(response).await.contains("payload must not be null"));
    }

    #[tokio::test]
    async fn not_found_echoes_value() {
        let response = AppError::NotFound(json!(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "42");
    }

    #[tokio::test]
    async fn internal_hides_message_but_attaches_fault() {
        let response =
            AppError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let fault = response.extensions().get::<Fault>().cloned().unwrap();
        assert_eq!(fault.0, "connection refused");

        let body = body_string(response).await;
        assert!(!body.contains("connection refused"));
        assert!(body.contains(GENERIC_ERROR));
    }
}
