use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalString;

/// Identity of a signer (responsable), keyed by CURP.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SignerId(String);

impl SignerId {
    pub fn new(curp: impl Into<String>) -> Self {
        SignerId(curp.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seal: base64 SHA256withRSA signature, the signer who produced it and
/// the exact canonical string it covers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Sello {
    signer: SignerId,
    /// Base64-encoded signature
    value: String,
    canonical: CanonicalString,
}

impl Sello {
    pub fn new(signer: SignerId, value: String, canonical: CanonicalString) -> Self {
        Self {
            signer,
            value,
            canonical,
        }
    }

    pub fn signer(&self) -> &SignerId {
        &self.signer
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn canonical(&self) -> &CanonicalString {
        &self.canonical
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_id_is_transparent_in_json() {
        let id = SignerId::new("GOMA800101HDFRRN09");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"GOMA800101HDFRRN09\"");
        assert_eq!(id.to_string(), "GOMA800101HDFRRN09");
    }

    #[test]
    fn test_sello_keeps_its_parts_together() {
        let sello = Sello::new(
            SignerId::new("CURP"),
            "c2lnbmF0dXJl".to_string(),
            CanonicalString::from("||1.0|X||"),
        );
        assert_eq!(sello.signer().as_str(), "CURP");
        assert_eq!(sello.canonical().as_str(), "||1.0|X||");
        let json = serde_json::to_value(&sello).unwrap();
        assert_eq!(json["signer"], "CURP");
        assert_eq!(json["canonical"], "||1.0|X||");
        assert_eq!(sello.into_value(), "c2lnbmF0dXJl");
    }
}
