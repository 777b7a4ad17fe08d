// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-tenant database lifecycle: create, drop, list.
//!
//! ## Isolation
//!
//! A tenant only ever reaches physical names built from its own verified
//! address, and listing is an anchored prefix match on that address. The
//! prefix is the sole isolation mechanism between tenants.
//!
//! ## Drop ordering
//!
//! 1. terminate every backend session on the database (admin connection)
//! 2. close and evict our own pool for it
//! 3. `DROP DATABASE IF EXISTS`
//!
//! Each step must finish before the next starts. Dropping first can block
//! on live sessions; evicting first would leave pooled connections that the
//! terminate step then kills underneath us.

use std::sync::Arc;

use tracing::{info, warn};

use super::catalog::{Catalog, DUPLICATE_DATABASE};
use super::pool_cache::PoolCache;
use super::DbError;
use crate::identity::{Identity, LogicalName, PhysicalName};

/// Creates, drops and lists tenant databases through the admin connection.
pub struct TenantDatabaseManager {
    catalog: Arc<dyn Catalog>,
    pools: Arc<PoolCache>,
}

impl TenantDatabaseManager {
    pub fn new(catalog: Arc<dyn Catalog>, pools: Arc<PoolCache>) -> Self {
        Self { catalog, pools }
    }

    /// Create `identity`'s database `name`.
    ///
    /// # Errors
    /// - `DbError::Validation` if `name` fails the allow-list
    /// - `DbError::DuplicateName` if it already exists
    /// - `DbError::CreateFailed` for any other engine error
    pub async fn create_database(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<LogicalName, DbError> {
        let logical = LogicalName::parse(name)?;
        let physical = PhysicalName::new(identity, &logical)?;

        let _guard = self.pools.lock(&physical).await;
        self.catalog
            .create_database(&physical)
            .await
            .map_err(|e| {
                if e.code.as_deref() == Some(DUPLICATE_DATABASE) {
                    DbError::DuplicateName(logical.to_string())
                } else {
                    DbError::CreateFailed(e.message)
                }
            })?;

        info!(address = %identity, database = %logical, "Created tenant database");
        Ok(logical)
    }

    /// Drop `identity`'s database `name`. Dropping a missing database succeeds.
    pub async fn drop_database(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<LogicalName, DbError> {
        let logical = LogicalName::parse(name)?;
        let physical = PhysicalName::new(identity, &logical)?;

        let mut guard = self.pools.lock(&physical).await;

        let terminated = self
            .catalog
            .terminate_sessions(&physical)
            .await
            .map_err(|e| DbError::DropFailed(e.message))?;
        if terminated > 0 {
            warn!(
                address = %identity,
                database = %logical,
                terminated,
                "Terminated active sessions before drop"
            );
        }

        guard.evict().await;

        self.catalog
            .drop_database(&physical)
            .await
            .map_err(|e| DbError::DropFailed(e.message))?;

        info!(address = %identity, database = %logical, "Dropped tenant database");
        Ok(logical)
    }

    /// Logical names of every database owned by `identity`, sorted.
    pub async fn list_databases(&self, identity: &Identity) -> Result<Vec<String>, DbError> {
        let prefix = identity.database_prefix();
        let physical = self
            .catalog
            .list_databases(&prefix)
            .await
            .map_err(|e| DbError::ListFailed(e.message))?;

        let mut names: Vec<String> = physical
            .iter()
            .filter_map(|name| name.strip_prefix(&prefix))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }
}
