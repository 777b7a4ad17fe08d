// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity and Database Name Validation
//!
//! Every tenant is keyed by a wallet address. Databases are addressed by a
//! tenant-chosen logical name, which maps deterministically to an engine-level
//! physical name:
//!
//! ```text
//! usr_{lower-cased address}_{logical name}
//! ```
//!
//! ## Security
//!
//! Database names cannot be bound as statement parameters, so the physical
//! name is interpolated into catalog statements. [`LogicalName`] can only be
//! constructed through the allow-list regex below and [`Identity`] only from
//! a lower-cased hex address, which makes [`PhysicalName`] safe to quote.
//! Do not relax either pattern without re-auditing `db::postgres`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ErrorKind;

/// Prefix shared by every tenant database.
pub const TENANT_DB_PREFIX: &str = "usr_";

/// Longest identifier the engine keeps without truncation (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Errors raised before any input reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid Ethereum address")]
    InvalidIdentity,

    #[error("Name must start with a letter, contain only letters/numbers/underscores, max 40 chars")]
    InvalidLogicalName,

    #[error("Database name is too long for this address (physical name exceeds {MAX_IDENTIFIER_LEN} bytes)")]
    IdentifierTooLong,

    #[error("SQL query is required")]
    EmptyQuery,
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidIdentity => "invalid_address",
            ValidationError::InvalidLogicalName => "invalid_name",
            ValidationError::IdentifierTooLong => "name_too_long",
            ValidationError::EmptyQuery => "empty_query",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

fn identity_regex() -> &'static Regex {
    static IDENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
    IDENTITY_REGEX.get_or_init(|| {
        Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("Failed to compile address regex")
    })
}

fn logical_name_regex() -> &'static Regex {
    static LOGICAL_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    LOGICAL_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,39}$").expect("Failed to compile name regex")
    })
}

/// True iff `s` is a `0x`-prefixed, 40 hex digit address.
///
/// Letter case is not checked against the EIP-55 checksum.
pub fn is_valid_identity(s: &str) -> bool {
    identity_regex().is_match(s)
}

/// True iff `s` matches `^[A-Za-z][A-Za-z0-9_]{0,39}$`.
pub fn is_valid_logical_name(s: &str) -> bool {
    logical_name_regex().is_match(s)
}

/// A normalized (lower-cased) wallet address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Validate and normalize an address.
    pub fn parse(address: &str) -> Result<Self, ValidationError> {
        if !is_valid_identity(address) {
            return Err(ValidationError::InvalidIdentity);
        }
        Ok(Identity(address.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix of every physical database owned by this identity.
    pub fn database_prefix(&self) -> String {
        format!("{TENANT_DB_PREFIX}{}_", self.0)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

/// A tenant-chosen database name that passed the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalName(String);

impl LogicalName {
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        if !is_valid_logical_name(name) {
            return Err(ValidationError::InvalidLogicalName);
        }
        Ok(LogicalName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LogicalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine-level database name; the sole key for catalog and pool lookups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalName(String);

impl PhysicalName {
    /// Derive the physical name for `identity`'s database `logical`.
    ///
    /// Fails when the result would be truncated by the engine.
    pub fn new(identity: &Identity, logical: &LogicalName) -> Result<Self, ValidationError> {
        let name = format!("{}{}", identity.database_prefix(), logical.as_str());
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(ValidationError::IdentifierTooLong);
        }
        Ok(PhysicalName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier for catalog statements.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for PhysicalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
