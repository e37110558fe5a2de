//! Device key material and derivation.
//!
//! The device key is derived from the fingerprint with PBKDF2-HMAC-SHA256
//! under a fixed application salt. The fingerprint is per-device (not a
//! shared password), so a fixed salt is acceptable; the iteration count
//! makes brute-forcing from a guessed fingerprint costly.

use crate::error::{CryptoError, CryptoResult};
use crate::fingerprint::DeviceFingerprint;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key size in bytes (256-bit).
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count for device-key derivation.
pub const KDF_ITERATIONS: u32 = 10_000;

/// Fixed application-wide KDF salt (domain separation, not secrecy).
const KDF_SALT: &[u8] = b"moneta-device-key-v1";

/// A 256-bit symmetric device key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DeviceKey {
    bytes: [u8; KEY_SIZE],
}

impl DeviceKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Base64 form used for the persisted key cache entry.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Parses a key from its persisted base64 form.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::KeyDerivation(format!("invalid stored key: {e}")))?;
        if raw.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: raw.len(),
            });
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&raw);
        Ok(Self { bytes })
    }
}

impl std::fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("DeviceKey(..)")
    }
}

/// Derives the device key from a fingerprint. Deterministic: the same
/// fingerprint always yields the same key.
pub fn derive_device_key(fingerprint: &DeviceFingerprint) -> DeviceKey {
    let mut bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        fingerprint.as_str().as_bytes(),
        KDF_SALT,
        KDF_ITERATIONS,
        &mut bytes,
    );
    DeviceKey::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let fp = DeviceFingerprint::from_string("abc123");
        let k1 = derive_device_key(&fp);
        let k2 = derive_device_key(&fp);
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_fingerprints_yield_different_keys() {
        let k1 = derive_device_key(&DeviceFingerprint::from_string("device-a"));
        let k2 = derive_device_key(&DeviceFingerprint::from_string("device-b"));
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn base64_roundtrip() {
        let key = derive_device_key(&DeviceFingerprint::from_string("roundtrip"));
        let restored = DeviceKey::from_base64(&key.to_base64()).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn wrong_length_rejected() {
        let err = DeviceKey::from_base64(&BASE64.encode([0u8; 16])).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength { expected: 32, actual: 16 }
        ));
    }
}
