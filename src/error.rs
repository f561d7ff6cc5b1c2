use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::tmdb::TmdbError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source: sea_orm::DbErr,
    },
}

impl AppError {
    /// Maps a failed TMDB call onto the proxy's taxonomy. `rejected` is shown
    /// when TMDB answered with an error status, `failed` when it could not be
    /// reached or its body could not be decoded.
    pub fn from_tmdb(err: TmdbError, rejected: &str, failed: &str) -> Self {
        match err {
            TmdbError::Status { status: StatusCode::NOT_FOUND, .. } => {
                Self::NotFound(rejected.to_string())
            },
            TmdbError::Status { status, .. }
                if status.is_client_error() || status.is_server_error() =>
            {
                Self::Upstream { status, message: rejected.to_string() }
            },
            TmdbError::Status { .. } => {
                Self::Upstream { status: StatusCode::BAD_GATEWAY, message: rejected.to_string() }
            },
            TmdbError::Network(_) | TmdbError::Decode(_) => {
                Self::Upstream { status: StatusCode::BAD_GATEWAY, message: failed.to_string() }
            },
        }
    }

    /// Mapper for endpoints that report every upstream failure the same way.
    pub fn upstream(message: &str) -> impl FnOnce(TmdbError) -> Self + '_ {
        move |err| Self::from_tmdb(err, message, message)
    }

    pub fn persistence(message: &str) -> impl FnOnce(sea_orm::DbErr) -> Self + '_ {
        move |source| Self::Persistence { message: message.to_string(), source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => *status,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(source: sea_orm::DbErr) -> Self {
        Self::Persistence { message: "Database error".to_string(), source }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Persistence { source, .. } => {
                tracing::error!(error = %source, "persistence failure");
            },
            Self::Upstream { status, .. } => tracing::warn!(%status, "upstream failure"),
            _ => {},
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode) -> TmdbError {
        TmdbError::Status { status, message: None }
    }

    #[test]
    fn upstream_not_found_becomes_not_found() {
        let err = AppError::from_tmdb(
            status_error(StatusCode::NOT_FOUND),
            "Credits not found",
            "Failed to fetch movie credits",
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Credits not found");
    }

    #[test]
    fn upstream_failure_status_passes_through() {
        let err = AppError::from_tmdb(
            status_error(StatusCode::SERVICE_UNAVAILABLE),
            "Failed to fetch popular movies",
            "Failed to fetch popular movies",
        );
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::from_tmdb(status_error(StatusCode::UNAUTHORIZED), "nope", "down");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn odd_upstream_status_becomes_bad_gateway() {
        let err = AppError::from_tmdb(status_error(StatusCode::MOVED_PERMANENTLY), "x", "y");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "x");
    }

    #[test]
    fn decode_failure_becomes_bad_gateway() {
        let decode = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = AppError::from_tmdb(
            TmdbError::Decode(decode),
            "Similar movies not found",
            "Failed to fetch similar movies",
        );
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Failed to fetch similar movies");
    }

    #[test]
    fn persistence_failure_is_a_server_error_with_its_message() {
        let err = AppError::persistence("Failed to fetch watch history")(sea_orm::DbErr::Custom(
            "disk I/O error".into(),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to fetch watch history");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_is_bad_request() {
        let err = AppError::Validation("Movie ID is required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
