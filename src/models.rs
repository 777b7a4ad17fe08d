// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Request fields are optional at the type level so that a missing field
//! reaches the handler and is reported as a 400 with a stable `error_code`
//! instead of a generic deserialization rejection.
//!
//! ## Model Categories
//!
//! - **Auth**: nonce challenge and signature verification
//! - **Databases**: create / list / drop tenant databases
//! - **Query**: run SQL inside one tenant database

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::db::QueryOutcome;

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NonceQuery {
    /// Wallet address requesting a challenge (`0x` + 40 hex digits).
    pub address: Option<String>,
}

/// Challenge text to be signed with `personal_sign`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NonceResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// Address the challenge was issued for.
    pub address: Option<String>,
    /// 65-byte hex signature over the challenge message.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct VerifyResponse {
    /// Bearer token valid for 24 hours.
    pub token: String,
    /// Normalized (lower-case) address the token was issued to.
    pub address: String,
}

// =============================================================================
// Database Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DatabaseListResponse {
    /// Logical names, sorted.
    pub databases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateDatabaseRequest {
    /// Letter first, then letters, digits or underscores; at most 40 chars.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreateDatabaseResponse {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeleteDatabaseResponse {
    pub deleted: String,
}

// =============================================================================
// Query Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// One or more statements, passed to the engine verbatim.
    pub sql: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// One object per row, keyed by column name.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Map<String, Value>>,
    /// Column names in order.
    pub fields: Vec<String>,
    /// Rows returned or affected.
    pub row_count: u64,
    /// Statement kind, e.g. `SELECT` or `INSERT`.
    pub command: String,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            rows: outcome.rows,
            fields: outcome.field_names,
            row_count: outcome.row_count,
            command: outcome.command_tag,
        }
    }
}
