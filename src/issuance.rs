//! End-to-end issuance of a signed title.
//!
//! Key material for each signer comes from a pluggable [`KeySource`]: one
//! institutional certificate for everybody, or one per signer.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::assembler::Assembler;
use crate::canonical::{CanonicalRecord, CanonicalString};
use crate::certificate::{load_certificate, CertificateInfo};
use crate::config::{InstitutionConfig, IssuerConfig, SigningCredentials};
use crate::core::{Sello, SignerId};
use crate::crypto::{sign_for, verify_sello};
use crate::error::{Error, TitleError};
use crate::keys::load_private_key;
use crate::pairing::keys_match;
use crate::title::{canonical_record, ordered_signers};
use crate::types::artifact::SignedArtifact;
use crate::types::title::{Responsable, TitleRecord};

// ---------------------------------------------------------------------------
// Key sources
// ---------------------------------------------------------------------------

/// Resolve the signing credentials for a signer.
pub trait KeySource: Send + Sync {
    /// Credentials for `signer`, or `None` if none are registered.
    fn credentials_for(&self, signer: &Responsable) -> Option<&SigningCredentials>;

    /// Whether any credentials are configured at all.
    fn is_configured(&self) -> bool;
}

/// One institutional certificate and key shared by every signer.
#[derive(Debug, Clone)]
pub struct InstitutionalKey {
    credentials: SigningCredentials,
}

impl InstitutionalKey {
    pub fn new(credentials: SigningCredentials) -> Self {
        Self { credentials }
    }
}

impl KeySource for InstitutionalKey {
    fn credentials_for(&self, _signer: &Responsable) -> Option<&SigningCredentials> {
        Some(&self.credentials)
    }

    fn is_configured(&self) -> bool {
        !self.credentials.is_empty()
    }
}

/// Credentials registered per signer CURP. Signers without an entry are
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct PerSignerKeys {
    by_curp: HashMap<String, SigningCredentials>,
}

impl PerSignerKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, curp: impl Into<String>, credentials: SigningCredentials) {
        self.by_curp.insert(curp.into(), credentials);
    }

    pub fn with(mut self, curp: impl Into<String>, credentials: SigningCredentials) -> Self {
        self.insert(curp, credentials);
        self
    }
}

impl KeySource for PerSignerKeys {
    fn credentials_for(&self, signer: &Responsable) -> Option<&SigningCredentials> {
        self.by_curp.get(&signer.curp)
    }

    fn is_configured(&self) -> bool {
        self.by_curp.values().any(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Issuer
// ---------------------------------------------------------------------------

pub struct Issuer<K: KeySource> {
    config: IssuerConfig,
    institution: InstitutionConfig,
    keys: K,
}

impl<K: KeySource> Issuer<K> {
    pub fn new(config: IssuerConfig, institution: InstitutionConfig, keys: K) -> Self {
        Self {
            config,
            institution,
            keys,
        }
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Check that the title can be signed with the configured key source.
    pub fn check_requirements(&self, title: &TitleRecord) -> Result<(), Error> {
        if !self.keys.is_configured() {
            return Err(Error::MissingCredentials);
        }
        if title.responsables.is_empty() {
            return Err(TitleError::NoSigners.into());
        }
        for signer in &title.responsables {
            match self.keys.credentials_for(signer) {
                Some(credentials) if !credentials.is_empty() => {}
                _ => {
                    return Err(Error::MissingSignerKey {
                        curp: signer.curp.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    pub fn canonical_record(&self, title: &TitleRecord) -> Result<CanonicalRecord, Error> {
        Ok(canonical_record(title, &self.institution)?)
    }

    /// Build, sign and assemble a title.
    ///
    /// Steps:
    /// 1. Check requirements
    /// 2. Build the canonical string
    /// 3. Per signer, in signing order: load certificate and key, validate
    ///    the pair, optionally check the validity window, sign, optionally
    ///    self-verify
    /// 4. Assemble the signed artifact
    pub fn issue(&self, title: &TitleRecord) -> Result<SignedArtifact, Error> {
        self.check_requirements(title)?;

        let record = self.canonical_record(title)?;
        let canonical = record.to_canonical_string();
        debug!(
            folio = %title.folio_control,
            chars = canonical.char_count(),
            bytes = canonical.as_bytes().len(),
            "canonical string built"
        );

        let mut sealed: Vec<(Sello, CertificateInfo)> = Vec::with_capacity(record.signer_count());
        for signer in ordered_signers(title) {
            let credentials =
                self.keys
                    .credentials_for(signer)
                    .ok_or_else(|| Error::MissingSignerKey {
                        curp: signer.curp.clone(),
                    })?;
            let id = SignerId::new(signer.curp.as_str());
            let (sello, certificate) = self.seal(&id, &canonical, credentials)?;
            sealed.push((sello, certificate));
        }

        let (sellos, certificates): (Vec<Sello>, Vec<CertificateInfo>) = sealed.into_iter().unzip();
        let artifact = Assembler::new(&record, title, &self.institution)
            .with_namespace(self.config.namespace.as_str())
            .assemble_with_certificates(sellos.into_iter().zip(certificates.iter()).collect())?;

        info!(
            folio = %title.folio_control,
            signers = artifact.firma_responsables.len(),
            "title issued"
        );
        Ok(artifact)
    }

    fn seal(
        &self,
        signer: &SignerId,
        canonical: &CanonicalString,
        credentials: &SigningCredentials,
    ) -> Result<(Sello, CertificateInfo), Error> {
        let certificate = load_certificate(credentials.certificate())?;
        let key = load_private_key(credentials.private_key(), credentials.password())?;

        if !keys_match(&certificate, &key, &self.config.pair_probe) {
            warn!(
                signer = %signer,
                serial = certificate.serial_number(),
                "certificate and key do not match"
            );
            return Err(Error::PairMismatch);
        }

        if self.config.require_valid_certificate && !certificate.is_currently_valid() {
            return Err(Error::CertificateNotValid {
                serial: certificate.serial_number().to_string(),
            });
        }

        let sello = sign_for(signer, canonical, &key)?;
        drop(key);

        if self.config.verify_after_signing && !verify_sello(&sello, &certificate)? {
            return Err(Error::SelfVerificationFailed {
                curp: signer.to_string(),
            });
        }

        Ok((sello, certificate))
    }
}
