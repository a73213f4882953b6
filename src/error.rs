use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::services::CatalogError;

/// Envelope for every listing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Client-facing request errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ApiError(ApiError::BadRequest(_)) => StatusCode::BAD_REQUEST,
            Self::CatalogError(CatalogError::NoMatch { .. }) => StatusCode::NOT_FOUND,
            Self::CatalogError(CatalogError::Ambiguous { .. }) => StatusCode::CONFLICT,
            Self::CatalogError(CatalogError::Scraper(_)) => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_) | Self::CatalogError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        ApiResponse::<()> {
            code: status.as_u16(),
            message: self.to_string(),
            data: None,
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TitleKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(ApiError::BadRequest("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CatalogError::Ambiguous {
                title: "Archer".into(),
                kind: TitleKind::Tv,
                count: 2
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::DatabaseError("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_carries_code() {
        let response = AppError::from(ApiError::BadRequest("no".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
