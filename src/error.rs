//! Unified application error model and HTTP mapping.
//! Every endpoint converts its failures into `AppError` at the boundary; the
//! response body always has the shape `{"error": <code>, "message": <text>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::identity::{CredentialError, StoreError, TokenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    BadRequest { code: String, message: String },
    Conflict { code: String, message: String },
    Unauthorized { code: String, message: String },
    MethodNotAllowed { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { code: String, message: String },
}

/// Wire shape shared by every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::BadRequest { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::MethodNotAllowed { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::MethodNotAllowed { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self { AppError::BadRequest { code: "bad_request".into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(msg: S) -> Self { AppError::Conflict { code: "conflict".into(), message: msg.into() } }
    pub fn unauthorized<S: Into<String>>(msg: S) -> Self { AppError::Unauthorized { code: "unauthorized".into(), message: msg.into() } }
    pub fn method_not_allowed<S: Into<String>>(msg: S) -> Self { AppError::MethodNotAllowed { code: "method_not_allowed".into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(msg: S) -> Self { AppError::NotFound { code: "not_found".into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AppError::Internal { code: "internal_error".into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody { error: self.code_str().to_string(), message: self.message().to_string() }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self.body())).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => AppError::conflict("identity already registered"),
            // Login collapses unknown identities into the same outcome as a bad password.
            StoreError::NotFound => AppError::unauthorized("invalid credentials"),
            StoreError::Credential(e) => e.into(),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        tracing::error!(target: "authgate::credential", "credential generation failed: {err}");
        AppError::internal("failed to generate credential")
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::unauthorized("invalid token"),
            TokenError::Signing(detail) => {
                tracing::error!(target: "authgate::session", "token signing failed: {detail}");
                AppError::internal("failed to issue token")
            }
        }
    }
}
