//! Field layout of the title canonical string, version 1.0.

use crate::canonical::{CanonicalField, CanonicalRecord};
use crate::config::InstitutionConfig;
use crate::core::SignerId;
use crate::error::TitleError;
use crate::types::title::{Responsable, TitleRecord};

pub const CANONICAL_VERSION: &str = "1.0";

/// Signers sorted by `orden_firma`; equal positions keep input order.
pub fn ordered_signers(title: &TitleRecord) -> Vec<&Responsable> {
    let mut signers: Vec<&Responsable> = title.responsables.iter().collect();
    signers.sort_by_key(|r| r.orden_firma);
    signers
}

/// Build the canonical record for a title.
///
/// Field order: version and folio, one block per signer, institution,
/// carrera, profesionista, expedicion, antecedente.
pub fn canonical_record(
    title: &TitleRecord,
    institution: &InstitutionConfig,
) -> Result<CanonicalRecord, TitleError> {
    let signers = ordered_signers(title);
    if signers.is_empty() {
        return Err(TitleError::NoSigners);
    }

    let mut builder = CanonicalRecord::builder();
    builder
        .push_text(CANONICAL_VERSION)?
        .push_text(title.folio_control.as_str())?;

    for signer in signers {
        builder.push_signer(
            SignerId::new(signer.curp.as_str()),
            [
                CanonicalField::text(signer.curp.as_str()),
                CanonicalField::text(signer.id_cargo.as_str()),
                CanonicalField::text(signer.cargo.as_str()),
                CanonicalField::optional_text(signer.abr_titulo.as_deref()),
            ],
        )?;
    }

    builder
        .push_text(institution.cve_institucion.as_str())?
        .push_text(institution.nombre_institucion.as_str())?;

    let carrera = &title.carrera;
    builder
        .push_text(carrera.cve_carrera.as_str())?
        .push_text(carrera.nombre_carrera.as_str())?
        .push_optional_date(carrera.fecha_inicio)?
        .push_date(carrera.fecha_terminacion)?
        .push_text(carrera.id_autorizacion_reconocimiento.as_str())?
        .push_text(carrera.autorizacion_reconocimiento.as_str())?
        .push_optional_text(carrera.numero_rvoe.as_deref())?;

    let profesionista = &title.profesionista;
    builder
        .push_text(profesionista.curp.as_str())?
        .push_text(profesionista.nombre.as_str())?
        .push_text(profesionista.primer_apellido.as_str())?
        .push_optional_text(profesionista.segundo_apellido.as_deref())?
        .push_text(profesionista.correo_electronico.as_str())?;

    let expedicion = &title.expedicion;
    builder
        .push_date(expedicion.fecha_expedicion)?
        .push_text(expedicion.id_modalidad_titulacion.as_str())?
        .push_text(expedicion.modalidad_titulacion.as_str())?
        .push_optional_date(expedicion.fecha_examen_profesional)?
        .push_optional_date(expedicion.fecha_exencion_examen_profesional)?
        .push_flag(expedicion.cumplio_servicio_social)?
        .push_optional_text(expedicion.id_fundamento_legal_servicio_social.as_deref())?
        .push_optional_text(expedicion.fundamento_legal_servicio_social.as_deref())?
        .push_text(institution.id_entidad_federativa.as_str())?
        .push_text(institution.entidad_federativa.as_str())?;

    let antecedente = &title.antecedente;
    builder
        .push_text(antecedente.institucion_procedencia.as_str())?
        .push_text(antecedente.id_tipo_estudio_antecedente.as_str())?
        .push_text(antecedente.tipo_estudio_antecedente.as_str())?
        .push_text(antecedente.id_entidad_federativa.as_str())?
        .push_text(antecedente.entidad_federativa.as_str())?
        .push_optional_date(antecedente.fecha_inicio)?
        .push_date(antecedente.fecha_terminacion)?
        .push_optional_text(antecedente.no_cedula.as_deref())?;

    Ok(builder.build())
}
