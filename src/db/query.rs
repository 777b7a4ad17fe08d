// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Arbitrary statement execution inside a tenant's own database.
//!
//! The statement text is passed to the engine untouched: no rewriting, no
//! injected limits, no semantic checks. An authenticated tenant is fully
//! trusted inside its own database.

use std::sync::Arc;

use super::catalog::UNDEFINED_DATABASE;
use super::pool::QueryOutcome;
use super::pool_cache::PoolCache;
use super::DbError;
use crate::identity::{Identity, LogicalName, PhysicalName, ValidationError};

pub struct QueryExecutor {
    pools: Arc<PoolCache>,
}

impl QueryExecutor {
    pub fn new(pools: Arc<PoolCache>) -> Self {
        Self { pools }
    }

    /// Run `sql` against `identity`'s database `name`.
    ///
    /// # Errors
    /// - `DbError::Validation` for a bad name or blank SQL
    /// - `DbError::QueryFailed` with the engine's message for anything the
    ///   engine rejects, including a database that no longer exists
    pub async fn execute(
        &self,
        identity: &Identity,
        name: &str,
        sql: &str,
    ) -> Result<QueryOutcome, DbError> {
        let logical = LogicalName::parse(name)?;
        if sql.trim().is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        let physical = PhysicalName::new(identity, &logical)?;

        let pool = self.pools.get_or_create(&physical).await?;
        match pool.execute(sql).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::debug!(
                    address = %identity,
                    database = %logical,
                    error = %e,
                    "Tenant query failed"
                );
                if e.code.as_deref() == Some(UNDEFINED_DATABASE) {
                    // No database behind this name; don't keep a pool for it.
                    self.pools.evict(&physical).await;
                }
                Err(DbError::QueryFailed(e.message))
            }
        }
    }
}
