use thiserror::Error;

/// Failure to decode private key material.
///
/// A wrong password and corrupt bytes produce the same error.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("private key format not recognized or wrong password")]
    UnrecognizedOrWrongPassword,
}

#[derive(Debug, Error)]
pub enum CertLoadError {
    #[error("malformed certificate: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum SignError {
    #[error("key cannot produce SHA256withRSA signatures: {0}")]
    KeyIncompatible(String),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("signature is not valid base64: {0}")]
    Malformed(#[from] base64::DecodeError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("field {index} contains the '|' delimiter")]
    DelimiterInValue { index: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TitleError {
    #[error("title declares no signers")]
    NoSigners,

    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("expected {expected} signatures, got {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[error("signature {position} belongs to {found}, expected {expected}")]
    SignerOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("signature of {signer} was computed over a different canonical string")]
    CanonicalMismatch { signer: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    KeyLoad(#[from] KeyLoadError),

    #[error(transparent)]
    CertLoad(#[from] CertLoadError),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Title(#[from] TitleError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("certificate and private key do not form a pair")]
    PairMismatch,

    #[error("no signing credentials configured")]
    MissingCredentials,

    #[error("no key material registered for signer {curp}")]
    MissingSignerKey { curp: String },

    #[error("certificate {serial} is outside its validity window")]
    CertificateNotValid { serial: String },

    #[error("seal for signer {curp} failed verification after signing")]
    SelfVerificationFailed { curp: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Structured code for this error, for reports and API responses.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::KeyLoad(_) => ErrorCode::KeyUnreadable,
            Error::CertLoad(_) => ErrorCode::CertificateMalformed,
            Error::Sign(_) => ErrorCode::KeyIncompatible,
            Error::Verify(_) => ErrorCode::SignatureMalformed,
            Error::Canonical(_) | Error::Title(_) => ErrorCode::CanonicalInvalid,
            Error::Assembly(_) => ErrorCode::AssemblyInvalid,
            Error::PairMismatch => ErrorCode::PairMismatch,
            Error::MissingCredentials | Error::MissingSignerKey { .. } => ErrorCode::KeyNotFound,
            Error::CertificateNotValid { .. } => ErrorCode::CertificateNotValid,
            Error::SelfVerificationFailed { .. } => ErrorCode::SignatureInvalid,
            Error::Json(_) => ErrorCode::ConfigInvalid,
        }
    }
}

/// Error codes for structured results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "SIGNATURE_INVALID")]
    SignatureInvalid,
    #[serde(rename = "SIGNATURE_MALFORMED")]
    SignatureMalformed,
    #[serde(rename = "CERTIFICATE_MALFORMED")]
    CertificateMalformed,
    #[serde(rename = "CERTIFICATE_NOT_VALID")]
    CertificateNotValid,
    #[serde(rename = "KEY_UNREADABLE")]
    KeyUnreadable,
    #[serde(rename = "KEY_INCOMPATIBLE")]
    KeyIncompatible,
    #[serde(rename = "KEY_NOT_FOUND")]
    KeyNotFound,
    #[serde(rename = "PAIR_MISMATCH")]
    PairMismatch,
    #[serde(rename = "CANONICAL_INVALID")]
    CanonicalInvalid,
    #[serde(rename = "ASSEMBLY_INVALID")]
    AssemblyInvalid,
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::SignatureInvalid => "SIGNATURE_INVALID",
            ErrorCode::SignatureMalformed => "SIGNATURE_MALFORMED",
            ErrorCode::CertificateMalformed => "CERTIFICATE_MALFORMED",
            ErrorCode::CertificateNotValid => "CERTIFICATE_NOT_VALID",
            ErrorCode::KeyUnreadable => "KEY_UNREADABLE",
            ErrorCode::KeyIncompatible => "KEY_INCOMPATIBLE",
            ErrorCode::KeyNotFound => "KEY_NOT_FOUND",
            ErrorCode::PairMismatch => "PAIR_MISMATCH",
            ErrorCode::CanonicalInvalid => "CANONICAL_INVALID",
            ErrorCode::AssemblyInvalid => "ASSEMBLY_INVALID",
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",
        };
        write!(f, "{}", s)
    }
}
