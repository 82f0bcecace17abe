//! Issuer configuration, institution data and signing credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::pairing::PAIR_PROBE;

/// Default namespace of the `TituloElectronico` document.
pub const SEP_NAMESPACE: &str = "https://www.siged.sep.gob.mx/titulos/";

/// Tunables for the issuance pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct IssuerConfig {
    pub namespace: String,
    /// Text signed and verified to prove a certificate/key pair.
    pub pair_probe: String,
    /// Refuse to sign with a certificate outside its validity window.
    pub require_valid_certificate: bool,
    /// Verify every seal against the certificate right after producing it.
    pub verify_after_signing: bool,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            namespace: SEP_NAMESPACE.to_string(),
            pair_probe: PAIR_PROBE.to_string(),
            require_valid_certificate: false,
            verify_after_signing: true,
        }
    }
}

impl IssuerConfig {
    /// Parse from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Institution-level data that every title carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionConfig {
    pub cve_institucion: String,
    pub nombre_institucion: String,
    pub id_entidad_federativa: String,
    pub entidad_federativa: String,
}

/// Certificate and private key bytes plus the key password.
///
/// Key bytes and password are wiped on drop and never printed.
#[derive(Clone)]
pub struct SigningCredentials {
    certificate: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
    password: Zeroizing<String>,
}

impl SigningCredentials {
    pub fn new(certificate: Vec<u8>, private_key: Vec<u8>, password: impl Into<String>) -> Self {
        Self {
            certificate,
            private_key: Zeroizing::new(private_key),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_empty(&self) -> bool {
        self.certificate.is_empty() || self.private_key.is_empty()
    }
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}
