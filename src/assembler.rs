//! Combines a canonical record, its seals and certificate metadata into a
//! [`SignedArtifact`].

use tracing::info;

use crate::canonical::CanonicalRecord;
use crate::certificate::CertificateInfo;
use crate::config::{InstitutionConfig, SEP_NAMESPACE};
use crate::core::Sello;
use crate::error::AssemblyError;
use crate::title::{ordered_signers, CANONICAL_VERSION};
use crate::types::artifact::{FirmaResponsable, SignedArtifact};
use crate::types::title::TitleRecord;

pub struct Assembler<'a> {
    record: &'a CanonicalRecord,
    title: &'a TitleRecord,
    institution: &'a InstitutionConfig,
    namespace: String,
}

impl<'a> Assembler<'a> {
    pub fn new(
        record: &'a CanonicalRecord,
        title: &'a TitleRecord,
        institution: &'a InstitutionConfig,
    ) -> Self {
        Self {
            record,
            title,
            institution,
            namespace: SEP_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Assemble with one certificate shared by every signer.
    pub fn assemble(
        &self,
        certificate: &CertificateInfo,
        sellos: Vec<Sello>,
    ) -> Result<SignedArtifact, AssemblyError> {
        self.assemble_with_certificates(sellos.into_iter().map(|s| (s, certificate)).collect())
    }

    /// Assemble with a certificate per seal, in signing order.
    ///
    /// # Errors
    ///
    /// Fails if the number of seals differs from the signer blocks in the
    /// record, if a seal's signer is out of place, or if a seal was computed
    /// over a different canonical string.
    pub fn assemble_with_certificates(
        &self,
        sealed: Vec<(Sello, &CertificateInfo)>,
    ) -> Result<SignedArtifact, AssemblyError> {
        let expected = self.record.signer_count();
        if sealed.len() != expected {
            return Err(AssemblyError::FieldCountMismatch {
                expected,
                actual: sealed.len(),
            });
        }

        let canonical = self.record.to_canonical_string();
        let profiles = ordered_signers(self.title);
        let mut firmas = Vec::with_capacity(sealed.len());

        for (position, (sello, certificate)) in sealed.into_iter().enumerate() {
            let declared = &self.record.signers()[position];
            if sello.signer() != declared {
                return Err(AssemblyError::SignerOrder {
                    position,
                    expected: declared.to_string(),
                    found: sello.signer().to_string(),
                });
            }
            let profile = profiles
                .get(position)
                .filter(|p| p.curp == declared.as_str())
                .ok_or_else(|| AssemblyError::SignerOrder {
                    position,
                    expected: declared.to_string(),
                    found: profiles
                        .get(position)
                        .map(|p| p.curp.clone())
                        .unwrap_or_default(),
                })?;
            if sello.canonical() != &canonical {
                return Err(AssemblyError::CanonicalMismatch {
                    signer: declared.to_string(),
                });
            }

            firmas.push(FirmaResponsable {
                nombre: profile.nombre.clone(),
                primer_apellido: profile.primer_apellido.clone(),
                segundo_apellido: profile.segundo_apellido.clone(),
                curp: profile.curp.clone(),
                id_cargo: profile.id_cargo.clone(),
                cargo: profile.cargo.clone(),
                abr_titulo: profile.abr_titulo.clone(),
                sello: sello.into_value(),
                certificado_responsable: certificate.to_base64(),
                no_certificado_responsable: certificate.serial_number().to_string(),
            });
        }

        info!(
            folio = %self.title.folio_control,
            signatures = firmas.len(),
            canonical_chars = canonical.char_count(),
            "signed title assembled"
        );

        Ok(SignedArtifact {
            namespace: self.namespace.clone(),
            version: CANONICAL_VERSION.to_string(),
            folio_control: self.title.folio_control.clone(),
            cadena_original: canonical,
            firma_responsables: firmas,
            institucion: self.institution.clone(),
            carrera: self.title.carrera.clone(),
            profesionista: self.title.profesionista.clone(),
            expedicion: self.title.expedicion.clone(),
            antecedente: self.title.antecedente.clone(),
        })
    }
}
