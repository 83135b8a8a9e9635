//! 核心错误处理模块
//!
//! 所有处理器返回 `Result<_, AppError>`，转换为 HTTP 响应只在这里进行。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

use crate::storage::StorageError;

/// 字段名 -> 该字段的错误信息
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("failed to extract product information")]
    ExtractionFailed,
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub timestamp: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::ExtractionFailed => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) | AppError::Storage(StorageError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, errors) = match self {
            AppError::Validation(errors) => {
                ("VALIDATION_ERROR", "Invalid input".to_string(), Some(errors))
            }
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            AppError::ExtractionFailed => (
                "EXTRACTION_FAILED",
                "Failed to extract product information from the provided URL".to_string(),
                None,
            ),
            AppError::NotFound(msg) => ("NOT_FOUND", msg, None),
            AppError::Storage(err @ StorageError::NotFound { .. }) => {
                ("NOT_FOUND", err.to_string(), None)
            }
            AppError::Storage(err) => {
                error!(error = %err, "storage failure");
                ("INTERNAL_SERVER_ERROR", "Internal server error".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: code,
            message,
            code: status.as_u16(),
            errors,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// 把 `validator` 的结果展开成 `AppError::Validation` 使用的字段表
pub fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, problems)| {
            let messages = problems
                .iter()
                .map(|problem| {
                    problem
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}"))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_carry_field_map() {
        let mut errors = FieldErrors::new();
        errors.insert("url".to_string(), vec!["Required".to_string()]);

        let (status, body) = body_json(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid input");
        assert_eq!(body["errors"]["url"][0], "Required");
    }

    #[tokio::test]
    async fn storage_failures_do_not_leak_details() {
        let err = AppError::Storage(StorageError::Unavailable("pool timed out on 10.0.0.3".into()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn storage_not_found_maps_to_404() {
        let err = AppError::Storage(StorageError::NotFound { entity: "product", id: 9 });
        let (status, _) = body_json(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn extraction_failure_is_client_error() {
        let (status, body) = body_json(AppError::ExtractionFailed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Failed to extract product information from the provided URL"
        );
    }
}
