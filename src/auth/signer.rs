//! Account signatures
//!
//! The server recomputes the same values, so the hash (lowercase hex MD5 of
//! the trimmed input) must not change.

use md5::{Digest, Md5};

/// Lowercase hex MD5 of `input` with surrounding whitespace trimmed.
pub fn hash(input: &str) -> String {
    format!("{:x}", Md5::digest(input.trim().as_bytes()))
}

/// `hash(uppercase(account) + hash(secret))`
pub fn sign(account: &str, secret: &str) -> String {
    hash(&format!("{}{}", account.to_uppercase(), hash(secret)))
}

/// Combine an account signature with a server-issued one-time code.
pub fn sign_login(signature: &str, code: &str) -> String {
    hash(&format!("{}{}", signature, code))
}
