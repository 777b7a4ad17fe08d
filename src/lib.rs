// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PrivateDB - Wallet-Authenticated Tenant Databases
//!
//! Each wallet address signs in by signing a one-time challenge and then
//! manages its own isolated PostgreSQL databases through one administrative
//! connection.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Nonce challenges, signature recovery, session tokens
//! - `db` - Tenant database lifecycle, pool cache, query execution
//! - `identity` - Address and database name validation

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod state;
