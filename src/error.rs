/*
 * Responsibility
 * - HTTP-facing error type (AppError) shared by middleware and handlers
 * - IntoResponse: stable error code + status, JSON body `{code, message, status}`
 * - Storage errors (CacheError) surface as store_unavailable, never as a denial
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::cache::CacheError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub status: u16,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authorization header missing.")]
    MissingToken,
    #[error("Invalid Authorization header.")]
    InvalidToken,
    #[error("The supplied token is disabled.")]
    TokenDisabled,
    #[error("The supplied token is not authorized.")]
    TokenForbidden,
    #[error("storage backend unavailable")]
    StoreUnavailable(#[from] CacheError),
    #[error("{resource} not found.")]
    NotFound { resource: &'static str },
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingToken => "missing_token",
            AppError::InvalidToken => "invalid_token",
            AppError::TokenDisabled => "token_disabled",
            AppError::TokenForbidden => "token_forbidden",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::NotFound { .. } => "not_found",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::TokenDisabled | AppError::TokenForbidden => StatusCode::FORBIDDEN,
            AppError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::StoreUnavailable(err) = &self {
            // The backend detail stays in the logs.
            tracing::error!(error = %err, "store unavailable");
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}
