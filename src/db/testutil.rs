// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory engine for unit tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use super::catalog::{Catalog, DUPLICATE_DATABASE};
use super::pool::{EngineError, PoolFactory, PoolHandle, QueryOutcome, TenantPool};
use crate::clock::{Clock, ManualClock};
use crate::identity::PhysicalName;
use crate::state::{AppState, AuthConfig};

pub const TEST_SECRET: &str = "test-secret-with-at-least-32-bytes!!";

/// Observable side effects, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    Create(String),
    Terminate(String),
    ClosePool(String),
    Drop(String),
    List(String),
}

#[derive(Default)]
struct Shared {
    databases: BTreeSet<String>,
    calls: Vec<CatalogCall>,
    opened: HashMap<String, usize>,
    executed: Vec<String>,
    fail_next: Option<String>,
}

/// Fake admin connection and pool factory sharing one set of databases.
#[derive(Default)]
pub struct FakeEngine {
    shared: Arc<Mutex<Shared>>,
    unhealthy: AtomicBool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Full application state backed by a fresh engine and a manual clock.
    pub fn app_state() -> (AppState, Arc<FakeEngine>) {
        let (state, engine, _clock) = Self::app_state_with_clock();
        (state, engine)
    }

    pub fn app_state_with_clock() -> (AppState, Arc<FakeEngine>, Arc<ManualClock>) {
        let engine = Self::new();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let config = AuthConfig {
            app_name: "PrivateDB".into(),
            jwt_secret: TEST_SECRET.into(),
            nonce_capacity: 100,
        };
        let state = AppState::with_clock(
            &config,
            engine.clone(),
            engine.clone(),
            clock.clone() as Arc<dyn Clock>,
        );
        (state, engine, clock)
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        lock(&self.shared).calls.clone()
    }

    pub fn executed(&self) -> Vec<String> {
        lock(&self.shared).executed.clone()
    }

    /// How many pools have been opened for `database`.
    pub fn opened(&self, database: &PhysicalName) -> usize {
        lock(&self.shared)
            .opened
            .get(database.as_str())
            .copied()
            .unwrap_or(0)
    }

    pub fn has_database(&self, database: &str) -> bool {
        lock(&self.shared).databases.contains(database)
    }

    /// Make the next catalog call fail with `message`.
    pub fn fail_next_catalog_call(&self, message: &str) {
        lock(&self.shared).fail_next = Some(message.to_string());
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    fn begin(&self, call: CatalogCall) -> Result<MutexGuard<'_, Shared>, EngineError> {
        let mut shared = lock(&self.shared);
        if let Some(message) = shared.fail_next.take() {
            return Err(EngineError::new(message));
        }
        shared.calls.push(call);
        Ok(shared)
    }
}

#[async_trait]
impl Catalog for FakeEngine {
    async fn create_database(&self, database: &PhysicalName) -> Result<(), EngineError> {
        let mut shared = self.begin(CatalogCall::Create(database.to_string()))?;
        if !shared.databases.insert(database.to_string()) {
            return Err(EngineError::with_code(
                format!("database \"{database}\" already exists"),
                DUPLICATE_DATABASE,
            ));
        }
        Ok(())
    }

    async fn terminate_sessions(&self, database: &PhysicalName) -> Result<u64, EngineError> {
        self.begin(CatalogCall::Terminate(database.to_string()))?;
        Ok(0)
    }

    async fn drop_database(&self, database: &PhysicalName) -> Result<(), EngineError> {
        let mut shared = self.begin(CatalogCall::Drop(database.to_string()))?;
        shared.databases.remove(database.as_str());
        Ok(())
    }

    async fn list_databases(&self, prefix: &str) -> Result<Vec<String>, EngineError> {
        let shared = self.begin(CatalogCall::List(prefix.to_string()))?;
        Ok(shared
            .databases
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), EngineError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(EngineError::new("connection refused"));
        }
        Ok(())
    }
}

impl PoolFactory for FakeEngine {
    fn open(&self, database: &PhysicalName) -> Result<PoolHandle, EngineError> {
        *lock(&self.shared)
            .opened
            .entry(database.to_string())
            .or_default() += 1;
        Ok(Arc::new(FakePool {
            database: database.to_string(),
            shared: self.shared.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Pool bound to one fake database.
///
/// Understands `SELECT <int> AS <ident>`; any statement starting with `FAIL`
/// is a syntax error; everything else succeeds with no rows.
pub struct FakePool {
    database: String,
    shared: Arc<Mutex<Shared>>,
    closed: AtomicBool,
}

#[async_trait]
impl TenantPool for FakePool {
    async fn execute(&self, sql: &str) -> Result<QueryOutcome, EngineError> {
        let mut shared = lock(&self.shared);
        shared.executed.push(sql.to_string());

        if self.is_closed() {
            return Err(EngineError::new("pool timed out while waiting for an open connection"));
        }
        if !shared.databases.contains(&self.database) {
            return Err(EngineError::with_code(
                format!("database \"{}\" does not exist", self.database),
                "3D000",
            ));
        }

        let trimmed = sql.trim();
        if trimmed.starts_with("FAIL") {
            return Err(EngineError::with_code(
                "syntax error at or near \"FAIL\"",
                "42601",
            ));
        }

        let command_tag = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        if let Some((value, column)) = parse_select_literal(trimmed) {
            let mut row = Map::new();
            row.insert(column.clone(), Value::from(value));
            return Ok(QueryOutcome {
                rows: vec![row],
                field_names: vec![column],
                row_count: 1,
                command_tag,
            });
        }

        Ok(QueryOutcome {
            command_tag,
            ..QueryOutcome::default()
        })
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            lock(&self.shared)
                .calls
                .push(CatalogCall::ClosePool(self.database.clone()));
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn parse_select_literal(sql: &str) -> Option<(i64, String)> {
    let words: Vec<&str> = sql.trim_end_matches(';').split_whitespace().collect();
    match words.as_slice() {
        [select, value, as_kw, column]
            if select.eq_ignore_ascii_case("select") && as_kw.eq_ignore_ascii_case("as") =>
        {
            Some((value.parse().ok()?, column.to_string()))
        }
        _ => None,
    }
}
