//! Encryption layer for Moneta.
//!
//! Provides at-rest protection for device-resident application state:
//! - A stable device fingerprint hashed from environment signals
//! - PBKDF2-HMAC-SHA256 key derivation (fixed salt, 10 000 iterations)
//! - ChaCha20-Poly1305 authenticated encryption of text payloads
//!
//! # Threat model
//!
//! The goal is at-rest obfuscation against casual inspection of device
//! storage. The key is derived and cached on the same device, so an
//! attacker who controls the running process is out of scope.
//!
//! # Architecture
//!
//! `DeviceKeyService` resolves the key exactly once per process (persisted
//! cache first, derivation from the fingerprint otherwise) and the single
//! `EncryptionCodec` built from it carries all encrypt/decrypt traffic.
//! Both artifacts persist under fixed names through the `KeyCache` trait,
//! which the storage backend implements.

mod cipher;
mod error;
mod fingerprint;
mod key;
mod service;

pub use cipher::{EncryptionCodec, NONCE_SIZE, TAG_SIZE, TextCodec};
pub use error::{CryptoError, CryptoResult};
pub use fingerprint::DeviceFingerprint;
pub use key::{DeviceKey, KDF_ITERATIONS, KEY_SIZE, derive_device_key};
pub use service::{
    DEVICE_KEY_CACHE_NAME, DeviceKeyService, FINGERPRINT_CACHE_NAME, KeyCache,
};
