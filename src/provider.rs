//! Process-wide registry of the cryptographic capabilities this crate relies on.
//!
//! The registry is immutable and built once. Hosts may call [`init`] at
//! startup; every operation that needs it calls it lazily as well.

use std::sync::OnceLock;

use crate::keys::KeyEncoding;

/// Signature algorithm name as used in certificates and logs.
pub const SIGNATURE_ALGORITHM: &str = "SHA256withRSA";

/// Smallest RSA modulus accepted for signing.
pub const MIN_MODULUS_BITS: usize = 1024;

/// Capabilities available to the signing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub signature_algorithm: &'static str,
    pub digest: &'static str,
    /// Key encodings in the order they are probed.
    pub key_encodings: &'static [KeyEncoding],
    pub min_modulus_bits: usize,
}

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Initialize the registry. Idempotent.
pub fn init() -> &'static Capabilities {
    CAPABILITIES.get_or_init(|| {
        let capabilities = Capabilities {
            signature_algorithm: SIGNATURE_ALGORITHM,
            digest: "SHA-256",
            key_encodings: &KeyEncoding::PROBE_ORDER,
            min_modulus_bits: MIN_MODULUS_BITS,
        };
        tracing::debug!(
            algorithm = capabilities.signature_algorithm,
            encodings = capabilities.key_encodings.len(),
            "signature provider registered"
        );
        capabilities
    })
}
