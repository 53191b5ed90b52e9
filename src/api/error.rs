//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::error::KeeperError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub KeeperError);

impl From<KeeperError> for AppError {
    fn from(err: KeeperError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            KeeperError::Config(_) => StatusCode::BAD_REQUEST,
            KeeperError::Http(_) => StatusCode::BAD_GATEWAY,
            KeeperError::Io(_) | KeeperError::Yaml(_) | KeeperError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({
            "error": self.0.to_string()
        });

        (status, Json(payload)).into_response()
    }
}
