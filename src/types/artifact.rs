use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalString;
use crate::config::InstitutionConfig;
use crate::error::Error;
use crate::types::title::{Antecedente, Carrera, Expedicion, Profesionista};

/// Signature block for one signer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirmaResponsable {
    pub nombre: String,
    pub primer_apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segundo_apellido: Option<String>,
    pub curp: String,
    pub id_cargo: String,
    pub cargo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abr_titulo: Option<String>,
    /// Base64 SHA256withRSA seal over the canonical string.
    pub sello: String,
    /// Base64 DER of the signing certificate.
    pub certificado_responsable: String,
    /// 20-character serial of the signing certificate.
    pub no_certificado_responsable: String,
}

/// A fully signed title: the canonical string, every signature block in
/// signing order and the data the document renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedArtifact {
    pub namespace: String,
    pub version: String,
    pub folio_control: String,
    pub cadena_original: CanonicalString,
    pub firma_responsables: Vec<FirmaResponsable>,
    pub institucion: InstitutionConfig,
    pub carrera: Carrera,
    pub profesionista: Profesionista,
    pub expedicion: Expedicion,
    pub antecedente: Antecedente,
}

impl SignedArtifact {
    /// Render the `TituloElectronico` XML document.
    pub fn to_xml(&self) -> String {
        crate::xml::render_titulo(self)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
