use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const RVOE_FEDERAL_ID: &str = "1";
pub const RVOE_FEDERAL: &str = "RVOE FEDERAL";

fn rvoe_federal_id() -> String {
    RVOE_FEDERAL_ID.to_string()
}

fn rvoe_federal() -> String {
    RVOE_FEDERAL.to_string()
}

/// Data for one electronic professional title, as it enters the signing
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TitleRecord {
    pub folio_control: String,
    pub responsables: Vec<Responsable>,
    pub carrera: Carrera,
    pub profesionista: Profesionista,
    pub expedicion: Expedicion,
    pub antecedente: Antecedente,
}

/// A signing official.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Responsable {
    pub nombre: String,
    pub primer_apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segundo_apellido: Option<String>,
    pub curp: String,
    pub id_cargo: String,
    pub cargo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abr_titulo: Option<String>,
    /// Position in the signing order; lower signs first.
    pub orden_firma: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Carrera {
    pub cve_carrera: String,
    pub nombre_carrera: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_terminacion: NaiveDate,
    #[serde(default = "rvoe_federal_id")]
    pub id_autorizacion_reconocimiento: String,
    #[serde(default = "rvoe_federal")]
    pub autorizacion_reconocimiento: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_rvoe: Option<String>,
}

/// The graduate receiving the title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profesionista {
    pub curp: String,
    pub nombre: String,
    pub primer_apellido: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segundo_apellido: Option<String>,
    pub correo_electronico: String,
}

/// Issuance details. The federal entity comes from the institution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Expedicion {
    pub fecha_expedicion: NaiveDate,
    pub id_modalidad_titulacion: String,
    pub modalidad_titulacion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_examen_profesional: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_exencion_examen_profesional: Option<NaiveDate>,
    pub cumplio_servicio_social: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_fundamento_legal_servicio_social: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamento_legal_servicio_social: Option<String>,
}

/// Prior studies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Antecedente {
    pub institucion_procedencia: String,
    pub id_tipo_estudio_antecedente: String,
    pub tipo_estudio_antecedente: String,
    pub id_entidad_federativa: String,
    pub entidad_federativa: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_terminacion: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_cedula: Option<String>,
}
