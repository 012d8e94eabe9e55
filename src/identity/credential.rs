//! One-time credential generation.
//!
//! Credentials are drawn from the OS CSPRNG only. If the entropy source fails
//! the caller gets an error; there is no fallback to a weaker generator.

use thiserror::Error;

pub const CREDENTIAL_LEN: usize = 6;

pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Largest multiple of 62 that fits in a byte; bytes at or above it are rejected
// so every symbol keeps probability 1/62.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

/// Generate a fresh 6-character alphanumeric credential.
pub fn generate() -> Result<String, CredentialError> {
    let mut out = String::with_capacity(CREDENTIAL_LEN);
    let mut buf = [0u8; 16];
    while out.len() < CREDENTIAL_LEN {
        getrandom::getrandom(&mut buf).map_err(|e| CredentialError::Entropy(e.to_string()))?;
        for b in buf {
            if b >= ACCEPT_BELOW { continue; }
            out.push(ALPHABET[(b as usize) % ALPHABET.len()] as char);
            if out.len() == CREDENTIAL_LEN { break; }
        }
    }
    Ok(out)
}
