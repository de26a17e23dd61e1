//! Error types for the server

use crate::error::BurnoutError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed or out-of-domain request body
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A categorical value outside the trained vocabulary
    #[error("Invalid value for {column}: {value}. Valid values are: {valid_values:?}")]
    UnknownCategory {
        column: String,
        value: String,
        valid_values: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Artifact inconsistency or any other server-side fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::UnknownCategory { .. } => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidInput(_) => "invalid_input",
            ServerError::UnknownCategory { .. } => "unknown_category",
            ServerError::NotFound(_) => "not_found",
            ServerError::Internal(_) => "internal",
        }
    }
}

impl From<BurnoutError> for ServerError {
    fn from(err: BurnoutError) -> Self {
        match err {
            BurnoutError::InvalidInput(msg) => ServerError::InvalidInput(msg),
            BurnoutError::UnknownCategory {
                column,
                value,
                valid_values,
            } => ServerError::UnknownCategory {
                column,
                value,
                valid_values,
            },
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ServerError::UnknownCategory {
                column,
                value,
                valid_values,
            } => json!({
                "error": true,
                "kind": self.kind(),
                "message": self.to_string(),
                "column": column,
                "value": value,
                "valid_values": valid_values,
            }),
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                json!({
                    "error": true,
                    "kind": self.kind(),
                    "message": "An internal error occurred",
                })
            }
            _ => json!({
                "error": true,
                "kind": self.kind(),
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let invalid: ServerError = BurnoutError::InvalidInput("Age".to_string()).into();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let unknown: ServerError = BurnoutError::UnknownCategory {
            column: "Gender".to_string(),
            value: "x".to_string(),
            valid_values: vec!["Female".to_string()],
        }
        .into();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        let config: ServerError = BurnoutError::ConfigError("no encoder".to_string()).into();
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = ServerError::NotFound("/nope".to_string());
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.kind(), "not_found");
    }
}
