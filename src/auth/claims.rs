// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated user representation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::Identity;

/// The wallet behind a verified session token.
///
/// This is the primary type used throughout the application to represent
/// the tenant making a request. Every database operation is scoped to
/// `address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Normalized wallet address
    #[schema(value_type = String)]
    pub address: Identity,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}
