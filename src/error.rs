// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error mapping.
//!
//! Every failure leaves the service as `{"error": "...", "error_code": "..."}`
//! with a status chosen by its [`ErrorKind`]:
//!
//! | Kind | Status |
//! |------|--------|
//! | `Validation` | 400 |
//! | `Auth` | 401 |
//! | `Conflict` | 500 |
//! | `Engine` | 500 |
//! | `Internal` | 500 |
//!
//! A duplicate database name is reported as 500 with `error_code`
//! `duplicate_name`; clients distinguish it by code, not status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AuthError, ChallengeError};
use crate::db::DbError;
use crate::identity::ValidationError;

/// Generic text returned for catalog failures; details go to the log only.
pub const CATALOG_FAILURE_MESSAGE: &str = "Database operation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Conflict,
    Engine,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Conflict | ErrorKind::Engine | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    pub error_code: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: kind.status(),
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, "internal_error", message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal authentication error");
                Self::internal("Internal server error")
            }
            other => Self::new(other.kind(), other.error_code(), other.to_string()),
        }
    }
}

impl From<ChallengeError> for ApiError {
    fn from(err: ChallengeError) -> Self {
        match err {
            ChallengeError::Validation(e) => e.into(),
            ChallengeError::Auth(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let (kind, code) = (err.kind(), err.error_code());
        if err.is_catalog_failure() {
            tracing::error!(error = %err, error_code = code, "Catalog operation failed");
            return Self::new(kind, code, CATALOG_FAILURE_MESSAGE);
        }
        match err {
            DbError::QueryFailed(msg) => Self::new(kind, code, msg),
            other => Self::new(kind, code, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}
