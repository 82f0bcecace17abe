//! Private key loading.
//!
//! Key files arrive in one of five encodings and carry no reliable marker of
//! which one, so a fixed table of decoders is tried in order and the first
//! success wins.

use std::fmt;

use pkcs8::{EncryptedPrivateKeyInfo, ObjectIdentifier, PrivateKeyInfo, SecretDocument};
use rsa::pkcs1::{DecodeRsaPrivateKey, ALGORITHM_OID as RSA_ENCRYPTION_OID};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::KeyLoadError;

const ENCRYPTED_PKCS8_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PKCS8_LABEL: &str = "PRIVATE KEY";
const PKCS1_LABEL: &str = "RSA PRIVATE KEY";

/// Encoding a private key was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyEncoding {
    PemEncryptedPkcs8,
    PemPkcs8,
    PemPkcs1,
    /// SAT `.key` files.
    DerEncryptedPkcs8,
    DerPkcs8,
}

impl KeyEncoding {
    pub const PROBE_ORDER: [KeyEncoding; 5] = [
        KeyEncoding::PemEncryptedPkcs8,
        KeyEncoding::PemPkcs8,
        KeyEncoding::PemPkcs1,
        KeyEncoding::DerEncryptedPkcs8,
        KeyEncoding::DerPkcs8,
    ];

    pub fn is_encrypted(self) -> bool {
        matches!(
            self,
            KeyEncoding::PemEncryptedPkcs8 | KeyEncoding::DerEncryptedPkcs8
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyEncoding::PemEncryptedPkcs8 => "PEM encrypted PKCS#8",
            KeyEncoding::PemPkcs8 => "PEM PKCS#8",
            KeyEncoding::PemPkcs1 => "PEM PKCS#1",
            KeyEncoding::DerEncryptedPkcs8 => "DER encrypted PKCS#8",
            KeyEncoding::DerPkcs8 => "DER PKCS#8",
        }
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum KeyMaterial {
    Rsa(RsaPrivateKey),
    /// A well-formed PKCS#8 key of another algorithm. Only the OID is kept.
    Unsupported { algorithm: ObjectIdentifier },
}

/// Decoded private key. Not printable and not serializable; RSA key memory
/// is zeroized when the handle is dropped.
pub struct PrivateKeyHandle {
    material: KeyMaterial,
    encoding: KeyEncoding,
}

impl PrivateKeyHandle {
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    /// Algorithm OID from the key container.
    pub fn algorithm(&self) -> ObjectIdentifier {
        match &self.material {
            KeyMaterial::Rsa(_) => RSA_ENCRYPTION_OID,
            KeyMaterial::Unsupported { algorithm } => *algorithm,
        }
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self.material, KeyMaterial::Rsa(_))
    }

    pub fn modulus_bits(&self) -> Option<usize> {
        self.rsa_key().map(|key| key.size() * 8)
    }

    pub fn public_key(&self) -> Option<RsaPublicKey> {
        self.rsa_key().map(RsaPrivateKey::to_public_key)
    }

    pub(crate) fn rsa_key(&self) -> Option<&RsaPrivateKey> {
        match &self.material {
            KeyMaterial::Rsa(key) => Some(key),
            KeyMaterial::Unsupported { .. } => None,
        }
    }
}

impl fmt::Debug for PrivateKeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyHandle")
            .field("encoding", &self.encoding)
            .field("algorithm", &self.algorithm().to_string())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
enum DecodeFailure {
    #[error("input is not PEM text")]
    NotPem,

    #[error("PEM label {found:?}, expected {expected:?}")]
    Label {
        expected: &'static str,
        found: String,
    },

    #[error("DER: {0}")]
    Der(#[from] pkcs8::der::Error),

    #[error("PKCS#8: {0}")]
    Pkcs8(#[from] pkcs8::Error),

    #[error("PKCS#1: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),
}

type Decoder = fn(&[u8], &str) -> Result<KeyMaterial, DecodeFailure>;

const DECODERS: [(KeyEncoding, Decoder); 5] = [
    (KeyEncoding::PemEncryptedPkcs8, decode_pem_encrypted_pkcs8 as Decoder),
    (KeyEncoding::PemPkcs8, decode_pem_pkcs8 as Decoder),
    (KeyEncoding::PemPkcs1, decode_pem_pkcs1 as Decoder),
    (KeyEncoding::DerEncryptedPkcs8, decode_der_encrypted_pkcs8 as Decoder),
    (KeyEncoding::DerPkcs8, decode_der_pkcs8 as Decoder),
];

/// Run each attempt in order and return the first success, tagged with its
/// kind. Failed attempts are logged at debug level and discarded.
fn first_success<K, T, E>(
    attempts: &[(K, fn(&[u8], &str) -> Result<T, E>)],
    bytes: &[u8],
    password: &str,
) -> Option<(K, T)>
where
    K: Copy + fmt::Display,
    E: fmt::Display,
{
    attempts
        .iter()
        .find_map(|(kind, attempt)| match attempt(bytes, password) {
            Ok(value) => Some((*kind, value)),
            Err(e) => {
                debug!(encoding = %kind, error = %e, "key decoding attempt failed");
                None
            }
        })
}

/// Decode a private key from any supported encoding.
///
/// A wrong password and an unrecognized format are reported identically.
pub fn load_private_key(bytes: &[u8], password: &str) -> Result<PrivateKeyHandle, KeyLoadError> {
    crate::provider::init();

    if bytes.is_empty() {
        warn!("empty private key buffer");
        return Err(KeyLoadError::UnrecognizedOrWrongPassword);
    }

    match first_success(&DECODERS, bytes, password) {
        Some((encoding, material)) => {
            let handle = PrivateKeyHandle { material, encoding };
            debug!(
                encoding = %encoding,
                encrypted = encoding.is_encrypted(),
                algorithm = %handle.algorithm(),
                bits = handle.modulus_bits(),
                "private key loaded"
            );
            Ok(handle)
        }
        None => {
            warn!(
                input_len = bytes.len(),
                "private key not recognized or password incorrect"
            );
            Err(KeyLoadError::UnrecognizedOrWrongPassword)
        }
    }
}

fn decode_pem_encrypted_pkcs8(bytes: &[u8], password: &str) -> Result<KeyMaterial, DecodeFailure> {
    let document = pem_document(bytes, ENCRYPTED_PKCS8_LABEL)?;
    decode_der_encrypted_pkcs8(document.as_bytes(), password)
}

fn decode_pem_pkcs8(bytes: &[u8], password: &str) -> Result<KeyMaterial, DecodeFailure> {
    let document = pem_document(bytes, PKCS8_LABEL)?;
    decode_der_pkcs8(document.as_bytes(), password)
}

fn decode_pem_pkcs1(bytes: &[u8], _password: &str) -> Result<KeyMaterial, DecodeFailure> {
    let document = pem_document(bytes, PKCS1_LABEL)?;
    let key = RsaPrivateKey::from_pkcs1_der(document.as_bytes())?;
    Ok(KeyMaterial::Rsa(key))
}

fn decode_der_encrypted_pkcs8(bytes: &[u8], password: &str) -> Result<KeyMaterial, DecodeFailure> {
    let encrypted = EncryptedPrivateKeyInfo::try_from(bytes)?;
    let decrypted = encrypted.decrypt(password)?;
    decode_der_pkcs8(decrypted.as_bytes(), password)
}

fn decode_der_pkcs8(bytes: &[u8], _password: &str) -> Result<KeyMaterial, DecodeFailure> {
    let info = PrivateKeyInfo::try_from(bytes)?;
    let algorithm = info.algorithm.oid;
    if algorithm == RSA_ENCRYPTION_OID {
        Ok(KeyMaterial::Rsa(RsaPrivateKey::try_from(info)?))
    } else {
        Ok(KeyMaterial::Unsupported { algorithm })
    }
}

fn pem_document(bytes: &[u8], expected: &'static str) -> Result<SecretDocument, DecodeFailure> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeFailure::NotPem)?;
    let text = text.trim_start();
    if !text.starts_with("-----BEGIN ") {
        return Err(DecodeFailure::NotPem);
    }
    let (label, document) = SecretDocument::from_pem(text)?;
    if label != expected {
        return Err(DecodeFailure::Label {
            expected,
            found: label.to_string(),
        });
    }
    Ok(document)
}
