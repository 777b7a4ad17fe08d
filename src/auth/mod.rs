// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet-signature login with no passwords.
//!
//! ## Auth Flow
//!
//! 1. Client requests a challenge: `GET /auth/nonce?address=0x...`
//! 2. Wallet signs the returned message (`personal_sign`)
//! 3. Client redeems it: `POST /auth/verify {address, signature}`
//!    - Server recovers the signer from the signature
//!    - Compares it to the claimed address (case-insensitive)
//!    - Mints a 24h session token
//! 4. Client sends `Authorization: Bearer <token>` on every `/db` request
//!
//! ## Security
//!
//! - Challenges expire after 5 minutes and are single-use
//! - Session tokens are HS256 JWTs; verification is stateless
//! - No clock skew leeway on token expiry

pub mod challenge;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod signature;
pub mod sweeper;
pub mod token;

pub use challenge::{ChallengeAuthenticator, ChallengeError, NonceStore};
pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::Auth;
pub use sweeper::NonceSweeper;
pub use token::SessionTokenIssuer;
