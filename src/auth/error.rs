// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ErrorKind;

/// Authentication error type.
///
/// Covers both halves of the sign-in flow: redeeming a nonce challenge and
/// presenting the resulting session token.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// No challenge was issued for this address (or it was already used)
    NoPendingChallenge,
    /// The challenge outlived its five minute window
    ChallengeExpired,
    /// Signature could not be decoded or recovered
    SignatureInvalid,
    /// Signature recovers to a different address
    SignatureMismatch,
    /// Token is malformed or its signature is invalid
    TokenInvalid,
    /// Token has expired
    TokenExpired,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::NoPendingChallenge => "no_pending_challenge",
            AuthError::ChallengeExpired => "challenge_expired",
            AuthError::SignatureInvalid => "invalid_signature",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::TokenInvalid => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InternalError(_) => ErrorKind::Internal,
            _ => ErrorKind::Auth,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.kind().status()
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authentication required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::NoPendingChallenge => write!(f, "No pending sign-in request; request a new nonce"),
            AuthError::ChallengeExpired => write!(f, "Nonce expired; request a new one"),
            AuthError::SignatureInvalid => write!(f, "Invalid signature"),
            AuthError::SignatureMismatch => write!(f, "Signature does not match wallet"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::InternalError(msg) = &self {
            tracing::error!(error = %msg, "Authentication failed internally");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
