// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{ChallengeAuthenticator, SessionTokenIssuer};
use crate::clock::{Clock, SystemClock};
use crate::db::{Catalog, PoolCache, PoolFactory, QueryExecutor, TenantDatabaseManager};

/// Settings for the sign-in flow.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shown in the first line of every challenge message.
    pub app_name: String,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Bound on pending challenges.
    pub nonce_capacity: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub challenges: Arc<ChallengeAuthenticator>,
    pub tokens: Arc<SessionTokenIssuer>,
    pub databases: Arc<TenantDatabaseManager>,
    pub queries: Arc<QueryExecutor>,
    pub catalog: Arc<dyn Catalog>,
    pub pools: Arc<PoolCache>,
}

impl AppState {
    pub fn new(auth: &AuthConfig, catalog: Arc<dyn Catalog>, factory: Arc<dyn PoolFactory>) -> Self {
        Self::with_clock(auth, catalog, factory, Arc::new(SystemClock))
    }

    pub fn with_clock(
        auth: &AuthConfig,
        catalog: Arc<dyn Catalog>,
        factory: Arc<dyn PoolFactory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pools = Arc::new(PoolCache::new(factory));
        Self {
            challenges: Arc::new(ChallengeAuthenticator::new(
                auth.app_name.clone(),
                auth.nonce_capacity,
                clock.clone(),
            )),
            tokens: Arc::new(SessionTokenIssuer::new(auth.jwt_secret.as_bytes(), clock)),
            databases: Arc::new(TenantDatabaseManager::new(catalog.clone(), pools.clone())),
            queries: Arc::new(QueryExecutor::new(pools.clone())),
            catalog,
            pools,
        }
    }
}
