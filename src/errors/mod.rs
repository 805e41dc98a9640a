use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

pub mod config;
pub mod generator;
pub mod repository;
pub mod service;

pub use config::ConfigError;
pub use generator::GeneratorError;
pub use repository::RepositoryError;
pub use service::ServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    // Service-level domain errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict error: {0}")]
    Conflict(String),
    #[error("Not found error: {0}")]
    NotFound(String),
    #[error("Allocation error: {0}")]
    AllocationExhausted(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("Internal error: {0}")]
    Internal(String),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AppError {
    /// Machine-readable error kind placed in the `type` field of the body
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION",
            AppError::Conflict(_) => "ALREADY_EXISTS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AllocationExhausted(_) => "ALLOCATION_EXHAUSTED",
            AppError::RateLimited(_) => "RATE_LIMITED",
            AppError::Internal(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_)
            | AppError::Database(_) => "INTERNAL",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::AllocationExhausted(msg)
            | AppError::RateLimited(msg) => msg.clone(),
            // Infrastructure details stay in the logs
            _ => "An internal error occurred".to_string(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => AppError::Validation(msg),
            ServiceError::AlreadyExists(_) => AppError::Conflict(err.to_string()),
            ServiceError::NotFound(_) => AppError::NotFound(err.to_string()),
            ServiceError::AllocationExhausted { .. } => {
                AppError::AllocationExhausted(err.to_string())
            }
            ServiceError::CodeGeneration(e) => AppError::Internal(e.to_string()),
            ServiceError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Flatten field errors into a single string
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reasons = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .clone()
                            .unwrap_or_else(|| e.code.clone())
                            .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, reasons)
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::Validation(message)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::AllocationExhausted(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("Request failed: {}", self);
        }

        let code = self.status_code().as_u16();
        HttpResponse::build(self.status_code()).json(json!({
            "type": self.error_type(),
            "message": self.message(),
            "status_code": code,
        }))
    }
}
