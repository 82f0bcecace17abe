use std::fmt::Write as _;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::canonical::OUTER_DELIMITER;
use crate::certificate::load_certificate;
use crate::crypto;
use crate::error::ErrorCode;

/// Structured result of checking a seal against a canonical string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    pub message: String,
    pub canonical_chars: usize,
    pub canonical_bytes: usize,
    pub seal_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_bytes: Option<usize>,
    pub starts_with_delimiter: bool,
    pub ends_with_delimiter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_serial: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl SealValidationReport {
    fn new(canonical: &str, seal: &str) -> Self {
        let starts = canonical.starts_with(OUTER_DELIMITER);
        let ends = canonical.ends_with(OUTER_DELIMITER);
        let mut warnings = vec![];
        if !starts || !ends {
            warnings.push("canonical string is not wrapped in '||'".to_string());
        }
        if seal.trim() != seal {
            warnings.push("seal has surrounding whitespace".to_string());
        }
        Self {
            valid: false,
            error_code: None,
            message: String::new(),
            canonical_chars: canonical.chars().count(),
            canonical_bytes: canonical.len(),
            seal_length: seal.len(),
            signature_bytes: general_purpose::STANDARD.decode(seal).ok().map(|b| b.len()),
            starts_with_delimiter: starts,
            ends_with_delimiter: ends,
            certificate_serial: None,
            warnings,
        }
    }

    fn fail(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.valid = false;
        self.error_code = Some(code);
        self.message = message.into();
        self
    }
}

/// Check `seal` over `canonical` with the certificate in `cert_bytes`.
///
/// Never fails: every problem is reported through `error_code`.
pub fn validate_seal(canonical: &str, seal: &str, cert_bytes: &[u8]) -> SealValidationReport {
    let mut report = SealValidationReport::new(canonical, seal);

    let certificate = match load_certificate(cert_bytes) {
        Ok(c) => c,
        Err(e) => return report.fail(ErrorCode::CertificateMalformed, e.to_string()),
    };
    report.certificate_serial = Some(certificate.serial_number().to_string());

    match crypto::verify(seal, canonical, &certificate) {
        Ok(true) => {
            report.valid = true;
            report.message = "seal is valid".to_string();
            report
        }
        Ok(false) => report.fail(
            ErrorCode::SignatureInvalid,
            "seal does not match the canonical string and certificate",
        ),
        Err(e) => report.fail(ErrorCode::SignatureMalformed, e.to_string()),
    }
}

/// Plain-text summary of a canonical string and seal, for troubleshooting.
pub fn describe_seal(canonical: &str, seal: &str) -> String {
    let report = SealValidationReport::new(canonical, seal);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "canonical: {} chars, {} bytes",
        report.canonical_chars, report.canonical_bytes
    );
    let _ = writeln!(
        out,
        "delimiters: starts={} ends={}",
        report.starts_with_delimiter, report.ends_with_delimiter
    );
    let preview: String = canonical.chars().take(100).collect();
    let _ = writeln!(out, "preview: {}", preview);
    let _ = writeln!(out, "seal: {} chars", report.seal_length);
    match report.signature_bytes {
        Some(n) => {
            let _ = write!(out, "signature: {} bytes ({} bits)", n, n * 8);
        }
        None => {
            let _ = write!(out, "signature: not valid base64");
        }
    }
    for warning in &report.warnings {
        let _ = write!(out, "\nwarning: {}", warning);
    }
    out
}
