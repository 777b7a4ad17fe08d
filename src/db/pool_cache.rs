// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide registry of tenant pools keyed by physical database name.
//!
//! ## Concurrency
//!
//! Each physical name owns a slot guarded by an async mutex. Holding a
//! slot's [`KeyGuard`] is the only way to read, create, or evict the pool in
//! it, so:
//!
//! - two first callers of [`PoolCache::get_or_create`] for one name create
//!   exactly one pool;
//! - create/drop sequences in the manager hold the guard for their whole
//!   duration, so no pool can be opened for a database that is mid-drop.
//!
//! Different names never contend beyond the brief map lookup.
//!
//! An empty slot is removed from the registry when its guard is released,
//! but only if no other task holds a reference to it. A waiter that already
//! cloned a slot therefore never ends up with a pool the registry no longer
//! sees, and names that never get a pool leave nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::pool::{PoolFactory, PoolHandle};
use super::DbError;
use crate::identity::PhysicalName;

type Slot = Arc<AsyncMutex<Option<PoolHandle>>>;
type Registry = Arc<Mutex<HashMap<PhysicalName, Slot>>>;

fn lock_registry(registry: &Registry) -> MutexGuard<'_, HashMap<PhysicalName, Slot>> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

/// Exclusive access to one physical name's pool slot.
pub struct KeyGuard {
    database: PhysicalName,
    slot: OwnedMutexGuard<Option<PoolHandle>>,
    registry: Registry,
}

impl KeyGuard {
    pub fn database(&self) -> &PhysicalName {
        &self.database
    }

    /// The cached pool, if any.
    pub fn pool(&self) -> Option<PoolHandle> {
        (*self.slot).clone()
    }

    /// Close the cached pool, then remove it. Returns whether one existed.
    ///
    /// The pool is fully closed before this returns.
    pub async fn evict(&mut self) -> bool {
        let Some(pool) = self.pool() else {
            return false;
        };
        pool.close().await;
        *self.slot = None;
        tracing::debug!(database = %self.database, "Evicted tenant pool");
        true
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        if self.slot.is_some() {
            return;
        }
        let mut slots = lock_registry(&self.registry);
        let held = OwnedMutexGuard::mutex(&self.slot);
        // Two references: the registry's and this guard's.
        let unreferenced = slots
            .get(&self.database)
            .is_some_and(|slot| Arc::ptr_eq(slot, held) && Arc::strong_count(slot) == 2);
        if unreferenced {
            slots.remove(&self.database);
        }
    }
}

/// Owns every tenant pool in the process.
pub struct PoolCache {
    factory: Arc<dyn PoolFactory>,
    slots: Registry,
}

impl PoolCache {
    pub fn new(factory: Arc<dyn PoolFactory>) -> Self {
        Self {
            factory,
            slots: Registry::default(),
        }
    }

    fn slot(&self, database: &PhysicalName) -> Slot {
        lock_registry(&self.slots)
            .entry(database.clone())
            .or_default()
            .clone()
    }

    /// Wait for exclusive access to `database`'s slot.
    pub async fn lock(&self, database: &PhysicalName) -> KeyGuard {
        let slot = self.slot(database).lock_owned().await;
        KeyGuard {
            database: database.clone(),
            slot,
            registry: self.slots.clone(),
        }
    }

    /// Return the cached pool under `guard`, opening one if the slot is empty.
    pub fn get_or_create_locked(&self, guard: &mut KeyGuard) -> Result<PoolHandle, DbError> {
        if let Some(pool) = guard.pool() {
            return Ok(pool);
        }

        let pool = self
            .factory
            .open(&guard.database)
            .map_err(|e| DbError::PoolUnavailable(e.message))?;
        *guard.slot = Some(pool.clone());
        tracing::debug!(database = %guard.database, "Opened tenant pool");
        Ok(pool)
    }

    /// Return the pool for `database`, creating and registering it on first use.
    pub async fn get_or_create(&self, database: &PhysicalName) -> Result<PoolHandle, DbError> {
        let mut guard = self.lock(database).await;
        self.get_or_create_locked(&mut guard)
    }

    /// Close and remove the pool for `database`. Idempotent.
    pub async fn evict(&self, database: &PhysicalName) -> bool {
        self.lock(database).await.evict().await
    }

    /// Whether a live pool is cached for `database`.
    pub async fn contains(&self, database: &PhysicalName) -> bool {
        self.lock(database).await.pool().is_some()
    }

    /// Close every cached pool. Used on shutdown.
    pub async fn close_all(&self) {
        let names: Vec<PhysicalName> = lock_registry(&self.slots).keys().cloned().collect();

        let mut closed = 0usize;
        for name in &names {
            if self.evict(name).await {
                closed += 1;
            }
        }
        tracing::info!(closed, "Closed tenant pools");
    }

    /// Number of names currently tracked, with or without a pool.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        lock_registry(&self.slots).len()
    }
}
