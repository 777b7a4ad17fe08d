// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Engine-facing seams: a pooled connection to one tenant database, and the
//! factory that opens one.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::identity::PhysicalName;

/// Shared handle to a tenant pool. Callers borrow one per operation and must
/// not keep it across a drop of the database.
pub type PoolHandle = Arc<dyn TenantPool>;

/// Failure reported by the relational engine.
///
/// `message` is the engine's own text; `code` is the SQLSTATE when the
/// engine supplied one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
    pub code: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

/// Normalized result of running a statement batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// One JSON object per returned row, keyed by column name.
    pub rows: Vec<Map<String, Value>>,
    /// Column names in select-list order.
    pub field_names: Vec<String>,
    /// Rows returned or affected.
    pub row_count: u64,
    /// Statement kind, e.g. `SELECT`, `INSERT`, `CREATE`.
    pub command_tag: String,
}

/// A pool of live connections to one physical database.
#[async_trait]
pub trait TenantPool: Send + Sync {
    /// Run `sql` verbatim and collect its results.
    async fn execute(&self, sql: &str) -> Result<QueryOutcome, EngineError>;

    /// Close every connection. Returns once the pool is fully shut down.
    async fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Opens pools for physical databases.
///
/// Opening must not perform I/O; connections are established on first use.
pub trait PoolFactory: Send + Sync {
    fn open(&self, database: &PhysicalName) -> Result<PoolHandle, EngineError>;
}
