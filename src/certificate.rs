//! X.509 certificate loading.

use std::fmt::Write as _;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use pkcs8::{DecodePublicKey, ObjectIdentifier};
use rsa::pkcs1::ALGORITHM_OID as RSA_ENCRYPTION_OID;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::{debug, warn};
use x509_cert::certificate::Version;
use x509_cert::der::{Decode, DecodePem, Encode};
use x509_cert::time::Time;
use x509_cert::Certificate;

use crate::error::CertLoadError;

/// Minimum width of a rendered serial number.
pub const SERIAL_WIDTH: usize = 20;

/// Metadata extracted from a signer certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    subject: String,
    issuer: String,
    serial_number: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    version: u8,
    signature_algorithm: ObjectIdentifier,
    key_algorithm: ObjectIdentifier,
    der: Vec<u8>,
    public_key: Option<RsaPublicKey>,
}

impl CertificateInfo {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Serial as uppercase hex, left-padded with `0` to [`SERIAL_WIDTH`].
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn signature_algorithm(&self) -> ObjectIdentifier {
        self.signature_algorithm
    }

    pub fn key_algorithm(&self) -> ObjectIdentifier {
        self.key_algorithm
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// DER encoding in standard base64, as embedded in signed documents.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.der)
    }

    /// RSA public key, or `None` when the certificate holds another key type.
    pub fn public_key(&self) -> Option<&RsaPublicKey> {
        self.public_key.as_ref()
    }

    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_before <= instant && instant <= self.not_after
    }

    pub fn is_currently_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Human-readable summary for diagnostics.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Certificate v{}", self.version);
        let _ = writeln!(out, "  Subject:    {}", self.subject);
        let _ = writeln!(out, "  Issuer:     {}", self.issuer);
        let _ = writeln!(out, "  Serial:     {}", self.serial_number);
        let _ = writeln!(
            out,
            "  Validity:   {} to {}",
            self.not_before.to_rfc3339(),
            self.not_after.to_rfc3339()
        );
        let _ = writeln!(out, "  Signature:  {}", self.signature_algorithm);
        match &self.public_key {
            Some(key) => {
                let _ = write!(out, "  Key:        RSA {} bits", key.size() * 8);
            }
            None => {
                let _ = write!(out, "  Key:        {} (not RSA)", self.key_algorithm);
            }
        }
        out
    }
}

/// Render serial number bytes as uppercase hex without leading zeros,
/// left-padded to [`SERIAL_WIDTH`]. Longer values are never truncated.
pub fn format_serial(bytes: &[u8]) -> String {
    let hex = hex::encode_upper(bytes);
    let digits = hex.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    format!("{:0>width$}", digits, width = SERIAL_WIDTH)
}

/// Parse a DER certificate. A PEM `CERTIFICATE` block is also accepted.
pub fn load_certificate(bytes: &[u8]) -> Result<CertificateInfo, CertLoadError> {
    if bytes.is_empty() {
        return Err(CertLoadError::Malformed("empty input".to_string()));
    }

    let parsed = if let Some(pem) = pem_text(bytes) {
        Certificate::from_pem(pem).and_then(|cert| cert.to_der().map(|der| (cert, der)))
    } else {
        Certificate::from_der(bytes).map(|cert| (cert, bytes.to_vec()))
    };
    let (certificate, der) = parsed.map_err(|e| {
        warn!(error = %e, "certificate could not be parsed");
        CertLoadError::Malformed(e.to_string())
    })?;

    let info = CertificateInfo::from_parsed(&certificate, der)?;
    debug!(
        subject = %info.subject,
        serial = %info.serial_number,
        not_after = %info.not_after,
        "certificate loaded"
    );
    Ok(info)
}

impl CertificateInfo {
    fn from_parsed(certificate: &Certificate, der: Vec<u8>) -> Result<Self, CertLoadError> {
        let tbs = &certificate.tbs_certificate;
        let spki = &tbs.subject_public_key_info;
        let key_algorithm = spki.algorithm.oid;

        let public_key = if key_algorithm == RSA_ENCRYPTION_OID {
            let spki_der = spki
                .to_der()
                .map_err(|e| CertLoadError::Malformed(e.to_string()))?;
            let key = RsaPublicKey::from_public_key_der(&spki_der)
                .map_err(|e| CertLoadError::Malformed(format!("RSA public key: {}", e)))?;
            Some(key)
        } else {
            None
        };

        let version = match tbs.version {
            Version::V1 => 1,
            Version::V2 => 2,
            Version::V3 => 3,
        };

        Ok(Self {
            subject: tbs.subject.to_string(),
            issuer: tbs.issuer.to_string(),
            serial_number: format_serial(tbs.serial_number.as_bytes()),
            not_before: to_utc(tbs.validity.not_before)?,
            not_after: to_utc(tbs.validity.not_after)?,
            version,
            signature_algorithm: certificate.signature_algorithm.oid,
            key_algorithm,
            der,
            public_key,
        })
    }
}

fn to_utc(time: Time) -> Result<DateTime<Utc>, CertLoadError> {
    let since_epoch = time.to_unix_duration();
    i64::try_from(since_epoch.as_secs())
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| CertLoadError::Malformed("validity date out of range".to_string()))
}

/// The input from its `-----BEGIN` line on, if it is PEM text.
fn pem_text(bytes: &[u8]) -> Option<&[u8]> {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let text = &bytes[start..];
    text.starts_with(b"-----BEGIN").then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{expired_validity, primary, self_signed, unrelated};
    use chrono::{Datelike, Duration};

    #[test]
    fn test_serial_formatting() {
        assert_eq!(format_serial(&[0x00, 0xFF]), "000000000000000000FF");
        assert_eq!(format_serial(&[0xFF]), "000000000000000000FF");
        assert_eq!(format_serial(&[0x00]), "00000000000000000000");
        assert_eq!(format_serial(&[0x0A, 0xBC]), "00000000000000000ABC");
    }

    #[test]
    fn test_long_serial_not_truncated() {
        let sat_like = b"30001000000500003416";
        let rendered = format_serial(sat_like);
        assert_eq!(rendered.len(), 40);
        assert_eq!(rendered, hex::encode_upper(sat_like));
    }

    #[test]
    fn test_load_der_certificate() {
        let fixture = primary();
        let info = load_certificate(&fixture.cert_der).unwrap();
        assert_eq!(info.serial_number(), "000000000000000000FF");
        assert_eq!(info.serial_number().len(), SERIAL_WIDTH);
        assert!(info.subject().contains("CN=Instituto de Estudios"));
        assert_eq!(info.subject(), info.issuer());
        assert_eq!(info.version(), 3);
        assert_eq!(info.der(), fixture.cert_der.as_slice());
        assert_eq!(info.public_key(), Some(&fixture.key.to_public_key()));
        assert!(info.is_currently_valid());
    }

    #[test]
    fn test_load_pem_certificate_matches_der() {
        let fixture = primary();
        let from_pem = load_certificate(&fixture.cert_pem()).unwrap();
        let from_der = load_certificate(&fixture.cert_der).unwrap();
        assert_eq!(from_pem, from_der);
    }

    #[test]
    fn test_leading_whitespace_before_pem_certificate() {
        let fixture = primary();
        let mut pem = b"  \n\r\n\t".to_vec();
        pem.extend(fixture.cert_pem());
        let info = load_certificate(&pem).unwrap();
        assert_eq!(info, load_certificate(&fixture.cert_der).unwrap());
        assert_eq!(pem_text(&pem), Some(&fixture.cert_pem()[..]));
        assert_eq!(pem_text(&fixture.cert_der), None);
    }

    #[test]
    fn test_base64_roundtrip() {
        let info = load_certificate(&unrelated().cert_der).unwrap();
        let decoded = general_purpose::STANDARD.decode(info.to_base64()).unwrap();
        assert_eq!(decoded, unrelated().cert_der);
        assert_eq!(info.serial_number(), "00000000000000010203");
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            load_certificate(&[]),
            Err(CertLoadError::Malformed(_))
        ));
        assert!(load_certificate(b"garbage").is_err());
        let der = &primary().cert_der;
        assert!(load_certificate(&der[..der.len() - 10]).is_err());
        assert!(load_certificate(b"-----BEGIN CERTIFICATE-----\n!!!\n-----END CERTIFICATE-----\n").is_err());
    }

    #[test]
    fn test_validity_window() {
        let info = load_certificate(&primary().cert_der).unwrap();
        assert!(info.is_valid_at(info.not_before()));
        assert!(info.is_valid_at(info.not_after()));
        assert!(!info.is_valid_at(info.not_before() - Duration::seconds(1)));
        assert!(!info.is_valid_at(info.not_after() + Duration::seconds(1)));
    }

    #[test]
    fn test_expired_certificate_still_loads() {
        let key = &primary().key;
        let der = self_signed(key, "CN=Vencido", &[0x10], expired_validity());
        let info = load_certificate(&der).unwrap();
        assert_eq!(info.not_after().year(), 2000);
        assert!(!info.is_currently_valid());
    }

    #[test]
    fn test_describe_mentions_key_facts() {
        let info = load_certificate(&primary().cert_der).unwrap();
        let text = info.describe();
        assert!(text.contains("000000000000000000FF"));
        assert!(text.contains("RSA 1024 bits"));
        assert!(text.contains("1.2.840.113549.1.1.11"));
    }
}
