// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalog operations run over the administrative connection.

use async_trait::async_trait;

use super::pool::EngineError;
use crate::identity::PhysicalName;

/// SQLSTATE raised when `CREATE DATABASE` targets an existing name.
pub const DUPLICATE_DATABASE: &str = "42P04";

/// SQLSTATE raised when connecting to a database that does not exist.
pub const UNDEFINED_DATABASE: &str = "3D000";

/// Database-level DDL and catalog lookups.
///
/// Implementations receive only validated [`PhysicalName`]s and must quote
/// them with [`PhysicalName::quoted`] when they cannot be bound.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// `CREATE DATABASE`. A duplicate reports [`DUPLICATE_DATABASE`].
    async fn create_database(&self, database: &PhysicalName) -> Result<(), EngineError>;

    /// Terminate every backend session connected to `database`.
    /// Returns how many were signalled.
    async fn terminate_sessions(&self, database: &PhysicalName) -> Result<u64, EngineError>;

    /// `DROP DATABASE IF EXISTS`.
    async fn drop_database(&self, database: &PhysicalName) -> Result<(), EngineError>;

    /// Every database whose name starts with `prefix` (literal, no wildcards).
    async fn list_databases(&self, prefix: &str) -> Result<Vec<String>, EngineError>;

    /// Round-trip to the engine.
    async fn ping(&self) -> Result<(), EngineError>;
}
