// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature recovery (EIP-191 `personal_sign`).
//!
//! Wallets sign the challenge text with the Ethereum signed-message prefix.
//! Recovery yields the signing address, which is then compared against the
//! address that requested the challenge.

use alloy::primitives::{Address, Signature};

use super::AuthError;

/// Recover the address that produced `signature` over `message`.
///
/// `signature` is the 65-byte `r || s || v` encoding as hex, with or without
/// a `0x` prefix.
///
/// # Errors
/// Returns `AuthError::SignatureInvalid` if the signature cannot be decoded
/// or no public key can be recovered from it.
pub fn recover_signer(message: &str, signature: &str) -> Result<Address, AuthError> {
    let bytes = alloy::hex::decode(signature.trim()).map_err(|_| AuthError::SignatureInvalid)?;
    let signature = Signature::from_raw(&bytes).map_err(|_| AuthError::SignatureInvalid)?;
    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|_| AuthError::SignatureInvalid)
}

/// Lower-case `0x` rendering used for identity comparison.
pub fn address_to_identity_string(address: &Address) -> String {
    format!("{address:#x}")
}
