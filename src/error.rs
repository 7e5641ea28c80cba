use crate::database::DatabaseError;
use crate::ingestion::{SalesError, ValidationError};
use crate::leaderboard::{AggregateError, LeaderboardError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    Validation(ValidationError),
    /// Persistence failure, with a message naming the operation that failed
    Storage {
        context: &'static str,
        source: DatabaseError,
    },
    /// Stored records that cannot be combined into totals
    Aggregation {
        context: &'static str,
        source: AggregateError,
    },
    BadRequest(String),
    PayloadTooLarge(String),
    NotFound(String),
    Internal(String),
}

/// Error body shared by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppError {
    /// Attach an operation message to a service error
    pub fn from_sales(context: &'static str) -> impl FnOnce(SalesError) -> AppError {
        move |err| match err {
            SalesError::Validation(err) => AppError::Validation(err),
            SalesError::Storage(source) => AppError::Storage { context, source },
        }
    }

    pub fn storage(context: &'static str) -> impl FnOnce(DatabaseError) -> AppError {
        move |source| AppError::Storage { context, source }
    }

    pub fn leaderboard(context: &'static str) -> impl FnOnce(LeaderboardError) -> AppError {
        move |err| match err {
            LeaderboardError::Storage(source) => AppError::Storage { context, source },
            LeaderboardError::Aggregate(source) => AppError::Aggregation { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Storage {
                source: DatabaseError::Constraint(_),
                ..
            } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Storage { .. }
            | AppError::Aggregation { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, error) = match self {
            AppError::Validation(err) => (err.to_string(), None),
            AppError::Storage {
                source: DatabaseError::Constraint(msg),
                ..
            } => (msg.clone(), None),
            AppError::Storage { context, source } => {
                (context.to_string(), Some(source.to_string()))
            }
            AppError::Aggregation { context, source } => {
                (context.to_string(), Some(source.to_string()))
            }
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) | AppError::NotFound(msg) => {
                (msg.clone(), None)
            }
            AppError::Config(err) => ("Configuration error".to_string(), Some(err.to_string())),
            AppError::Internal(msg) => ("Internal server error".to_string(), Some(msg.clone())),
        };

        ErrorBody {
            success: false,
            message,
            error,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {}", err),
            AppError::Validation(err) => write!(f, "Validation error: {}", err),
            AppError::Storage { context, source } => write!(f, "{}: {}", context, source),
            AppError::Aggregation { context, source } => write!(f, "{}: {}", context, source),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
