//! Mapping of request failures onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use epaper_core::StoreError;
use log::{error, info};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("display or alias '{0}' not found")]
    NotFound(String),

    #[error("display '{0}' has no image yet")]
    NotReady(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::NotFound(_) => info!("{}", self),
            _ => error!("Request failed: {}", self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
