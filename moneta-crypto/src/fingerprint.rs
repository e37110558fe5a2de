//! Stable device fingerprint used as key-derivation input.
//!
//! The fingerprint is a SHA-256 hash over whatever environment signals the
//! host exposes. It is computed once, persisted under a fixed name, and
//! reused forever — regenerating it would orphan every encrypted record.

use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

/// A stable, locally-derived device identifier (hex-encoded SHA-256).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    /// Generates a fingerprint from the current environment.
    ///
    /// Never fails: when no signal at all is available the fingerprint is
    /// derived from process-random entropy instead. That fallback is weaker
    /// (it cannot be re-derived after a cache wipe) but a working key must
    /// always be produced.
    pub fn generate() -> Self {
        let signals = collect_signals();
        if signals.is_empty() {
            warn!("no environment signals available, falling back to random fingerprint");
            let mut entropy = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut entropy);
            return Self(hex_digest(&entropy));
        }
        Self(hex_digest(signals.join("|").as_bytes()))
    }

    /// Reconstructs a fingerprint from its persisted string form.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The fingerprint string (key-derivation input and persisted form).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collect whatever stable environment signals this host exposes.
fn collect_signals() -> Vec<String> {
    let mut signals: Vec<String> = vec![
        format!("os:{}", std::env::consts::OS),
        format!("arch:{}", std::env::consts::ARCH),
    ];

    for (label, var) in [
        ("user", "USER"),
        ("user", "USERNAME"),
        ("locale", "LANG"),
        ("home", "HOME"),
        ("home", "USERPROFILE"),
        ("host", "HOSTNAME"),
    ] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                signals.push(format!("{label}:{value}"));
            }
        }
    }

    signals
}

fn hex_digest(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
