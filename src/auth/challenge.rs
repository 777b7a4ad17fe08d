// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nonce challenges for wallet sign-in.
//!
//! ## Flow
//!
//! 1. Client asks for a challenge for its address.
//! 2. Server stores `{message, expires_at}` under the normalized address and
//!    returns the message text.
//! 3. Client signs the message with its wallet (`personal_sign`).
//! 4. Client redeems `(address, signature)`; the server recovers the signer
//!    and compares it to the address.
//!
//! ## Invariants
//!
//! - At most one pending challenge per address. Issuing again overwrites.
//! - A challenge is consumed by the first redemption that finds it, whatever
//!   the outcome. The entry is popped under the store lock before evaluation,
//!   so concurrent redemptions cannot both observe it.
//! - Redemption after `expires_at` always fails.
//!
//! Pending challenges live in process memory only; a restart invalidates all
//! of them.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use lru::LruCache;
use ring::rand::{SecureRandom, SystemRandom};

use super::signature::{address_to_identity_string, recover_signer};
use super::AuthError;
use crate::clock::Clock;
use crate::identity::{Identity, ValidationError};

/// How long a challenge may be redeemed after issuance.
pub const CHALLENGE_TTL: Duration = Duration::minutes(5);

/// Default bound on concurrently pending challenges.
pub const DEFAULT_NONCE_CAPACITY: usize = 10_000;

/// Random bytes per nonce.
const NONCE_BYTES: usize = 16;

/// A challenge waiting to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Pending challenges keyed by normalized address.
///
/// LRU-bounded so a flood of nonce requests cannot grow memory without
/// limit; expired entries are dropped lazily on lookup and by
/// [`NonceStore::purge_expired`].
pub struct NonceStore {
    pending: Mutex<LruCache<Identity, PendingChallenge>>,
}

impl NonceStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            pending: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<Identity, PendingChallenge>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a challenge, discarding any prior one for the same identity.
    pub fn insert(&self, identity: Identity, challenge: PendingChallenge) {
        self.lock().put(identity, challenge);
    }

    /// Remove and return the pending challenge for `identity`.
    pub fn take(&self, identity: &Identity) -> Option<PendingChallenge> {
        self.lock().pop(identity)
    }

    /// Drop every challenge that expired before `now`. Returns how many.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut pending = self.lock();
        let expired: Vec<Identity> = pending
            .iter()
            .filter(|(_, challenge)| now > challenge.expires_at)
            .map(|(identity, _)| identity.clone())
            .collect();
        for identity in &expired {
            pending.pop(identity);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Issues and redeems sign-in challenges.
pub struct ChallengeAuthenticator {
    app_name: String,
    store: NonceStore,
    clock: Arc<dyn Clock>,
    rng: SystemRandom,
}

impl ChallengeAuthenticator {
    pub fn new(app_name: impl Into<String>, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            app_name: app_name.into(),
            store: NonceStore::new(capacity),
            clock,
            rng: SystemRandom::new(),
        }
    }

    pub fn store(&self) -> &NonceStore {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue a fresh challenge for `address` and return the text to sign.
    ///
    /// # Errors
    /// - `ChallengeError::Validation` if `address` is not a valid address.
    /// - `ChallengeError::Auth(InternalError)` if the system RNG fails.
    pub fn issue_challenge(&self, address: &str) -> Result<String, ChallengeError> {
        let identity = Identity::parse(address)?;

        let mut nonce = [0u8; NONCE_BYTES];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| AuthError::InternalError("system RNG unavailable".to_string()))?;

        let issued_at = self.clock.now();
        let message = render_message(&self.app_name, address, &nonce, issued_at);

        self.store.insert(
            identity.clone(),
            PendingChallenge {
                message: message.clone(),
                expires_at: issued_at + CHALLENGE_TTL,
            },
        );

        tracing::debug!(address = %identity, "Issued sign-in challenge");
        Ok(message)
    }

    /// Redeem the pending challenge for `address` with `signature`.
    ///
    /// Returns the verified identity. The pending challenge is consumed as
    /// soon as it is found, including when the checks below fail.
    pub fn redeem(&self, address: &str, signature: &str) -> Result<Identity, AuthError> {
        // A malformed address cannot have a pending challenge. Reporting it as
        // such keeps this endpoint from telling well-formed addresses apart.
        let identity = Identity::parse(address).map_err(|_| AuthError::NoPendingChallenge)?;

        let challenge = self
            .store
            .take(&identity)
            .ok_or(AuthError::NoPendingChallenge)?;

        if self.clock.now() > challenge.expires_at {
            return Err(AuthError::ChallengeExpired);
        }

        let recovered = recover_signer(&challenge.message, signature)?;
        if address_to_identity_string(&recovered) != identity.as_str() {
            tracing::info!(
                address = %identity,
                recovered = %recovered,
                "Sign-in signature does not match wallet"
            );
            return Err(AuthError::SignatureMismatch);
        }

        tracing::info!(address = %identity, "Wallet sign-in verified");
        Ok(identity)
    }
}

/// Issuing a challenge fails either on input or on the RNG.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

fn render_message(app_name: &str, address: &str, nonce: &[u8], issued_at: DateTime<Utc>) -> String {
    [
        format!("Sign in to {app_name}"),
        String::new(),
        "This signature proves ownership of your wallet.".to_string(),
        "It does not send a transaction or cost any gas.".to_string(),
        String::new(),
        format!("Wallet: {address}"),
        format!("Nonce: {}", alloy::hex::encode_prefixed(nonce)),
        format!(
            "Issued At: {}",
            issued_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
    ]
    .join("\n")
}
