//! Authenticated text encryption (ChaCha20-Poly1305).
//!
//! Blobs are self-contained strings: `"mv1:" + base64(nonce ‖ ciphertext)`.
//! A fresh random nonce is drawn per call, so encrypting the same plaintext
//! twice yields different blobs — callers must only ever compare decrypted
//! plaintext.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DeviceKey;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

/// ChaCha20-Poly1305 nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Version prefix on every encrypted blob. Anything without it was never
/// produced by this codec.
const BLOB_PREFIX: &str = "mv1:";

/// Symmetric codec over opaque text payloads, keyed by the device key.
///
/// One instance is constructed at startup and injected into the storage
/// layer; all encrypt/decrypt traffic flows through it.
pub struct EncryptionCodec {
    cipher: ChaCha20Poly1305,
}

impl EncryptionCodec {
    pub fn new(key: DeviceKey) -> Self {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        Self { cipher }
    }

    /// Encrypts a plaintext string into a self-contained blob.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut raw = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);

        Ok(format!("{BLOB_PREFIX}{}", BASE64.encode(raw)))
    }

    /// Decrypts a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails with [`CryptoError::Decryption`] for anything that does not
    /// decode to valid text under the current key: wrong key, truncated or
    /// tampered blobs, and values that were never encrypted. Never returns
    /// garbage.
    pub fn decrypt(&self, blob: &str) -> CryptoResult<String> {
        let encoded = blob
            .strip_prefix(BLOB_PREFIX)
            .ok_or_else(|| CryptoError::Decryption("missing blob prefix".into()))?;

        let raw = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;

        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("blob too short".into()));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                CryptoError::Decryption("authentication failed (wrong key or tampered blob)".into())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".into()))
    }
}

/// Seam between the codec and the storage layer.
///
/// The secure store only needs text-in/text-out; tests substitute failing
/// implementations to exercise the plaintext fallback path.
pub trait TextCodec: Send + Sync {
    fn encrypt_text(&self, plaintext: &str) -> CryptoResult<String>;
    fn decrypt_text(&self, blob: &str) -> CryptoResult<String>;
}

impl TextCodec for EncryptionCodec {
    fn encrypt_text(&self, plaintext: &str) -> CryptoResult<String> {
        self.encrypt(plaintext)
    }

    fn decrypt_text(&self, blob: &str) -> CryptoResult<String> {
        self.decrypt(blob)
    }
}
