//! HMAC signature verification.
//!
//! Providers sign webhook payloads with HMAC-SHA1 or HMAC-SHA256 and send the
//! digest hex-encoded, sometimes prefixed with the algorithm name
//! (`sha256=<hex>`). All comparisons run in constant time and every failure
//! mode (bad hex, unknown algorithm, wrong length) reports `false` rather
//! than an error.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Hash function underlying an HMAC signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Name used in `<alg>=<hex>` signature headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    /// Parse an algorithm prefix. Only `sha1` and `sha256` are recognised.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute `HMAC(algorithm, key, message)`.
///
/// HMAC accepts keys of any length, including empty ones.
pub fn sign(algorithm: HashAlgorithm, key: &[u8], message: &[u8]) -> Vec<u8> {
    compute(algorithm, key, message).unwrap_or_default()
}

fn compute(algorithm: HashAlgorithm, key: &[u8], message: &[u8]) -> Option<Vec<u8>> {
    match algorithm {
        HashAlgorithm::Sha1 => {
            let mut mac = <HmacSha1 as Mac>::new_from_slice(key).ok()?;
            mac.update(message);
            Some(mac.finalize().into_bytes().to_vec())
        }
        HashAlgorithm::Sha256 => {
            let mut mac = <HmacSha256 as Mac>::new_from_slice(key).ok()?;
            mac.update(message);
            Some(mac.finalize().into_bytes().to_vec())
        }
    }
}

/// Hex-encoded [`sign`].
///
/// # Examples
///
/// ```rust
/// use scm_bridge::hmac::{sign_encoded, validate_encoded, HashAlgorithm};
///
/// let sig = sign_encoded(HashAlgorithm::Sha256, b"topsecret", b"{}");
/// assert!(validate_encoded(HashAlgorithm::Sha256, b"{}", b"topsecret", &sig));
/// ```
pub fn sign_encoded(algorithm: HashAlgorithm, key: &[u8], message: &[u8]) -> String {
    hex::encode(sign(algorithm, key, message))
}

/// Check `signature` against the HMAC of `message` under `key`.
///
/// An empty signature never validates.
pub fn validate(algorithm: HashAlgorithm, message: &[u8], key: &[u8], signature: &[u8]) -> bool {
    if signature.is_empty() {
        return false;
    }
    match compute(algorithm, key, message) {
        Some(expected) => constant_time_eq(&expected, signature),
        None => false,
    }
}

/// [`validate`] with a hex-encoded signature. Invalid hex is `false`.
pub fn validate_encoded(
    algorithm: HashAlgorithm,
    message: &[u8],
    key: &[u8],
    signature: &str,
) -> bool {
    match hex::decode(signature) {
        Ok(decoded) => validate(algorithm, message, key, &decoded),
        Err(_) => false,
    }
}

/// Validate an `<alg>=<hex>` signature such as `sha256=5c4a...`.
///
/// Unknown algorithms and values without `=` are rejected.
pub fn validate_prefix(message: &[u8], key: &[u8], signature: &str) -> bool {
    let Some((prefix, encoded)) = signature.split_once('=') else {
        return false;
    };
    match HashAlgorithm::from_prefix(prefix) {
        Some(algorithm) => validate_encoded(algorithm, message, key, encoded),
        None => false,
    }
}

/// Constant-time byte comparison. Length is compared first, which leaks only
/// the length.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
#[path = "hmac_tests.rs"]
mod tests;
