// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tenant databases.
//!
//! ## Layout
//!
//! - [`catalog`]: database-level DDL over the administrative connection
//! - [`pool`]: the pooled-connection seam and its engine error type
//! - [`pool_cache`]: one pool per physical database, with per-name locking
//! - [`manager`]: create / drop / list scoped to one identity
//! - [`query`]: arbitrary SQL inside one tenant database
//! - [`postgres`]: sqlx-backed implementations

pub mod catalog;
pub mod error;
pub mod manager;
pub mod pool;
pub mod pool_cache;
pub mod postgres;
pub mod query;

#[cfg(test)]
pub mod testutil;

pub use catalog::Catalog;
pub use error::DbError;
pub use manager::TenantDatabaseManager;
pub use pool::{EngineError, PoolFactory, PoolHandle, QueryOutcome, TenantPool};
pub use pool_cache::{KeyGuard, PoolCache};
pub use postgres::{PgCatalog, PgPoolFactory};
pub use query::QueryExecutor;
