//! SHA256withRSA (RSASSA-PKCS#1 v1.5) seals over canonical strings.

use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use sha2::Sha256;
use tracing::debug;

use crate::canonical::CanonicalString;
use crate::certificate::CertificateInfo;
use crate::core::{Sello, SignerId};
use crate::error::{SignError, VerifyError};
use crate::keys::PrivateKeyHandle;

/// Sign the UTF-8 bytes of `canonical` and return the base64 signature.
///
/// # Errors
///
/// Returns [`SignError::KeyIncompatible`] if the key is not RSA or its
/// modulus is below the registered minimum.
pub fn sign(canonical: &str, key: &PrivateKeyHandle) -> Result<String, SignError> {
    let capabilities = crate::provider::init();

    let rsa_key = key.rsa_key().ok_or_else(|| {
        SignError::KeyIncompatible(format!("key algorithm {} is not RSA", key.algorithm()))
    })?;

    let bits = rsa_key.size() * 8;
    if bits < capabilities.min_modulus_bits {
        return Err(SignError::KeyIncompatible(format!(
            "{}-bit modulus is below the {}-bit minimum",
            bits, capabilities.min_modulus_bits
        )));
    }

    let signing_key = SigningKey::<Sha256>::new(rsa_key.clone());
    let signature = signing_key
        .try_sign(canonical.as_bytes())
        .map_err(|e| SignError::KeyIncompatible(e.to_string()))?;

    let encoded = general_purpose::STANDARD.encode(signature.to_bytes());
    debug!(
        canonical_bytes = canonical.len(),
        seal_len = encoded.len(),
        "canonical string signed"
    );
    Ok(encoded)
}

/// Sign on behalf of `signer`, keeping the seal bound to what it covers.
pub fn sign_for(
    signer: &SignerId,
    canonical: &CanonicalString,
    key: &PrivateKeyHandle,
) -> Result<Sello, SignError> {
    let value = sign(canonical.as_str(), key)?;
    debug!(signer = %signer, "seal produced");
    Ok(Sello::new(signer.clone(), value, canonical.clone()))
}

/// Verify a base64 seal over `canonical` with the certificate's public key.
///
/// Any mismatch yields `Ok(false)`: altered text, altered signature, a
/// different certificate or a certificate without an RSA key.
///
/// # Errors
///
/// Returns [`VerifyError::Malformed`] if the seal is not valid base64.
pub fn verify(
    signature_b64: &str,
    canonical: &str,
    certificate: &CertificateInfo,
) -> Result<bool, VerifyError> {
    let signature_bytes = general_purpose::STANDARD.decode(signature_b64)?;

    let Some(public_key) = certificate.public_key() else {
        debug!(serial = certificate.serial_number(), "certificate has no RSA key");
        return Ok(false);
    };

    let Ok(signature) = Signature::try_from(signature_bytes.as_slice()) else {
        return Ok(false);
    };

    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
    let valid = verifying_key.verify(canonical.as_bytes(), &signature).is_ok();
    debug!(
        serial = certificate.serial_number(),
        valid,
        "seal verified"
    );
    Ok(valid)
}

/// Verify a [`Sello`] against the canonical string it carries.
pub fn verify_sello(sello: &Sello, certificate: &CertificateInfo) -> Result<bool, VerifyError> {
    verify(sello.value(), sello.canonical().as_str(), certificate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::load_certificate;
    use crate::keys::load_private_key;
    use crate::test_support::{primary, unrelated, KEY_PASSWORD};
    use proptest::prelude::*;

    fn primary_key() -> PrivateKeyHandle {
        load_private_key(&primary().pkcs8_der(), "").unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let key = primary_key();
        let cert = load_certificate(&primary().cert_der).unwrap();
        let seal = sign("||1.0|ABC123||", &key).unwrap();
        assert!(verify(&seal, "||1.0|ABC123||", &cert).unwrap());
        assert!(!verify(&seal, "||1.0|ABC124||", &cert).unwrap());
    }

    #[test]
    fn test_unrelated_certificate_rejects() {
        let key = primary_key();
        let other = load_certificate(&unrelated().cert_der).unwrap();
        let seal = sign("||1.0|ABC123||", &key).unwrap();
        assert!(!verify(&seal, "||1.0|ABC123||", &other).unwrap());
    }

    #[test]
    fn test_signature_is_deterministic_and_sized() {
        let key = primary_key();
        let first = sign("||x||", &key).unwrap();
        let second = sign("||x||", &key).unwrap();
        assert_eq!(first, second);
        let raw = general_purpose::STANDARD.decode(&first).unwrap();
        assert_eq!(raw.len(), 128);
    }

    #[test]
    fn test_every_encoding_produces_the_same_seal() {
        let fixture = primary();
        let inputs = [
            fixture.encrypted_pkcs8_pem(KEY_PASSWORD),
            fixture.pkcs8_pem(),
            fixture.pkcs1_pem(),
            fixture.encrypted_pkcs8_der(KEY_PASSWORD),
            fixture.pkcs8_der(),
        ];
        let seals: Vec<String> = inputs
            .iter()
            .map(|bytes| {
                let key = load_private_key(bytes, KEY_PASSWORD).unwrap();
                sign("||1.0|ABC123||", &key).unwrap()
            })
            .collect();
        assert!(seals.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_malformed_base64() {
        let cert = load_certificate(&primary().cert_der).unwrap();
        let err = verify("not*base64!", "||x||", &cert).unwrap_err();
        assert!(matches!(err, VerifyError::Malformed(_)));
    }

    #[test]
    fn test_wrong_length_signature_is_false() {
        let cert = load_certificate(&primary().cert_der).unwrap();
        let short = general_purpose::STANDARD.encode([1u8, 2, 3]);
        assert!(!verify(&short, "||x||", &cert).unwrap());
    }

    #[test]
    fn test_non_rsa_key_is_incompatible() {
        use p256::pkcs8::EncodePrivateKey;
        let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
        let der = secret.to_pkcs8_der().unwrap();
        let key = load_private_key(der.as_bytes(), "").unwrap();
        let err = sign("||x||", &key).unwrap_err();
        assert!(matches!(err, SignError::KeyIncompatible(_)));
    }

    #[test]
    fn test_sign_for_binds_signer_and_text() {
        let key = primary_key();
        let cert = load_certificate(&primary().cert_der).unwrap();
        let canonical = CanonicalString::from("||1.0|F-1|CURP||");
        let sello = sign_for(&SignerId::new("CURP"), &canonical, &key).unwrap();
        assert_eq!(sello.signer().as_str(), "CURP");
        assert_eq!(sello.canonical(), &canonical);
        assert!(verify_sello(&sello, &cert).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_any_text_change_breaks_the_seal(text in "[^|]{1,40}", flip in any::<prop::sample::Index>()) {
            let key = primary_key();
            let cert = load_certificate(&primary().cert_der).unwrap();
            let canonical = format!("||1.0|{}||", text);
            let seal = sign(&canonical, &key).unwrap();
            prop_assert!(verify(&seal, &canonical, &cert).unwrap());

            let mut tampered: Vec<char> = canonical.chars().collect();
            let i = flip.index(tampered.len());
            tampered[i] = if tampered[i] == 'X' { 'Y' } else { 'X' };
            let tampered: String = tampered.into_iter().collect();
            prop_assert!(!verify(&seal, &tampered, &cert).unwrap());
        }

        #[test]
        fn prop_any_signature_byte_change_breaks_the_seal(flip in any::<prop::sample::Index>(), bit in 0u8..8) {
            let key = primary_key();
            let cert = load_certificate(&primary().cert_der).unwrap();
            let seal = sign("||1.0|ABC123||", &key).unwrap();
            let mut raw = general_purpose::STANDARD.decode(&seal).unwrap();
            let i = flip.index(raw.len());
            raw[i] ^= 1 << bit;
            let tampered = general_purpose::STANDARD.encode(&raw);
            prop_assert!(!verify(&tampered, "||1.0|ABC123||", &cert).unwrap());
        }
    }
}
