//! Certificate / private key pair validation by sign-then-verify round trip.

use tracing::{debug, info, warn};

use crate::certificate::{load_certificate, CertificateInfo};
use crate::crypto::{sign, verify};
use crate::error::Error;
use crate::keys::{load_private_key, PrivateKeyHandle};

/// Text signed and verified to prove a pair.
pub const PAIR_PROBE: &str = "TEST_VALIDATION";

/// Whether `key` produces seals that `certificate` accepts.
pub fn keys_match(certificate: &CertificateInfo, key: &PrivateKeyHandle, probe: &str) -> bool {
    let seal = match sign(probe, key) {
        Ok(seal) => seal,
        Err(e) => {
            debug!(error = %e, "probe could not be signed");
            return false;
        }
    };
    matches!(verify(&seal, probe, certificate), Ok(true))
}

/// Load both halves and check that they belong together.
///
/// # Errors
///
/// Load failures are returned as-is; a failed round trip is
/// [`Error::PairMismatch`].
pub fn ensure_pair_with_probe(
    cert_bytes: &[u8],
    key_bytes: &[u8],
    password: &str,
    probe: &str,
) -> Result<(), Error> {
    let certificate = load_certificate(cert_bytes)?;
    let key = load_private_key(key_bytes, password)?;
    if keys_match(&certificate, &key, probe) {
        info!(serial = certificate.serial_number(), "certificate and key form a pair");
        Ok(())
    } else {
        warn!(serial = certificate.serial_number(), "certificate and key do not match");
        Err(Error::PairMismatch)
    }
}

pub fn ensure_pair(cert_bytes: &[u8], key_bytes: &[u8], password: &str) -> Result<(), Error> {
    ensure_pair_with_probe(cert_bytes, key_bytes, password, PAIR_PROBE)
}

/// `true` only for a loadable certificate and key that form a pair.
pub fn validate_pair(cert_bytes: &[u8], key_bytes: &[u8], password: &str) -> bool {
    match ensure_pair(cert_bytes, key_bytes, password) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "pair validation failed");
            false
        }
    }
}
