use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationError;

/// Outcome classes of register / login. Messages are what the client sees.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User already exists")]
    Conflict,

    #[error("User not found")]
    NotFound,

    #[error("Invalid password")]
    InvalidCredential,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::InvalidInput(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct AuthErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Internal(e) => {
                error!(error = %e, "auth internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        let body = AuthErrorBody {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ThoughtError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body or query string could not be read.
    #[error("{0}")]
    BadRequest(String),

    #[error("Thought not found")]
    NotFound,

    #[error("Something went wrong")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for ThoughtError {
    fn from(rejection: JsonRejection) -> Self {
        ThoughtError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ThoughtError {
    fn from(rejection: QueryRejection) -> Self {
        ThoughtError::BadRequest(rejection.body_text())
    }
}

// an id that does not parse cannot name a stored thought
impl From<PathRejection> for ThoughtError {
    fn from(_: PathRejection) -> Self {
        ThoughtError::NotFound
    }
}

/// `{"errors": {"message": "..."}}`, the shape feed clients parse first.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub errors: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl IntoResponse for ThoughtError {
    fn into_response(self) -> Response {
        let status = match &self {
            ThoughtError::Validation(_) | ThoughtError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ThoughtError::NotFound => StatusCode::NOT_FOUND,
            ThoughtError::Internal(e) => {
                error!(error = %e, "thought store error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorEnvelope {
            errors: ErrorDetail {
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
