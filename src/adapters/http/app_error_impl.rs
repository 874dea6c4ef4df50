use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const INTERNAL_MESSAGE: &str = "internal server error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        match self {
            AppError::InvalidInput(msg) => {
                tracing::warn!(error = %msg, "Request rejected");
                error_resp(StatusCode::BAD_REQUEST, code, msg)
            }
            AppError::NotFound(_) => {
                tracing::warn!(error = %self, "Request target missing");
                error_resp(StatusCode::NOT_FOUND, code, self.to_string())
            }
            AppError::Database(_) => {
                // Details stay in the logs only.
                tracing::error!(error = ?self, "Request failed");
                error_resp(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message, "code": code.as_str() });
    (status, Json(body)).into_response()
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::invalid("invalid id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invalid_input_is_400_with_message() {
        let response = AppError::invalid("price must be greater than 0").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "price must be greater than 0");
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = AppError::NotFound("subscription").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "subscription not found");
    }

    #[tokio::test]
    async fn storage_errors_are_opaque() {
        let response =
            AppError::Database("connection refused on 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal server error");
        assert_eq!(body["code"], "DATABASE_ERROR");
    }
}
