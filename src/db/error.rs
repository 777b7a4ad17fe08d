// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tenant database errors.

use crate::error::ErrorKind;
use crate::identity::ValidationError;

/// Error type for tenant database operations.
///
/// Validation failures are always detected before the engine is contacted.
/// Engine failures carry the engine's message and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Failed to create database: {0}")]
    CreateFailed(String),

    #[error("Failed to drop database: {0}")]
    DropFailed(String),

    #[error("Failed to list databases: {0}")]
    ListFailed(String),

    #[error("{0}")]
    QueryFailed(String),

    #[error("Connection pool unavailable: {0}")]
    PoolUnavailable(String),
}

impl DbError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DbError::Validation(e) => e.error_code(),
            DbError::DuplicateName(_) => "duplicate_name",
            DbError::CreateFailed(_) => "create_failed",
            DbError::DropFailed(_) => "drop_failed",
            DbError::ListFailed(_) => "list_failed",
            DbError::QueryFailed(_) => "query_failed",
            DbError::PoolUnavailable(_) => "pool_unavailable",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(e) => e.kind(),
            DbError::DuplicateName(_) => ErrorKind::Conflict,
            _ => ErrorKind::Engine,
        }
    }

    /// Whether the message came from the administrative connection rather
    /// than the tenant's own database.
    pub fn is_catalog_failure(&self) -> bool {
        matches!(
            self,
            DbError::CreateFailed(_)
                | DbError::DropFailed(_)
                | DbError::ListFailed(_)
                | DbError::PoolUnavailable(_)
        )
    }
}
