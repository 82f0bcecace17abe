//! `TituloElectronico` XML rendering.

use chrono::NaiveDate;

use crate::types::artifact::SignedArtifact;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Escape a value for use inside a double-quoted attribute.
pub fn xml_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Empty element with attributes, written on one line.
struct Element<'a> {
    out: &'a mut String,
}

impl<'a> Element<'a> {
    fn open(out: &'a mut String, indent: usize, name: &str) -> Self {
        for _ in 0..indent {
            out.push('\t');
        }
        out.push('<');
        out.push_str(name);
        Self { out }
    }

    fn attr(self, name: &str, value: &str) -> Self {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&xml_escape(value));
        self.out.push('"');
        self
    }

    /// Omitted when absent or empty.
    fn opt_attr(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.attr(name, v),
            _ => self,
        }
    }

    fn date(self, name: &str, value: NaiveDate) -> Self {
        self.attr(name, &value.format(DATE_FORMAT).to_string())
    }

    fn opt_date(self, name: &str, value: Option<NaiveDate>) -> Self {
        match value {
            Some(d) => self.date(name, d),
            None => self,
        }
    }

    fn close_empty(self) {
        self.out.push_str("/>\n");
    }

    fn close_open(self) {
        self.out.push_str(">\n");
    }
}

pub(crate) fn render_titulo(artifact: &SignedArtifact) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    Element::open(&mut out, 0, "TituloElectronico")
        .attr("xmlns", &artifact.namespace)
        .attr("version", &artifact.version)
        .attr("folioControl", &artifact.folio_control)
        .close_open();

    out.push_str("\t<FirmaResponsables>\n");
    for firma in &artifact.firma_responsables {
        Element::open(&mut out, 2, "FirmaResponsable")
            .attr("nombre", &firma.nombre)
            .attr("primerApellido", &firma.primer_apellido)
            .opt_attr("segundoApellido", firma.segundo_apellido.as_deref())
            .attr("curp", &firma.curp)
            .attr("idCargo", &firma.id_cargo)
            .attr("cargo", &firma.cargo)
            .opt_attr("abrTitulo", firma.abr_titulo.as_deref())
            .attr("sello", &firma.sello)
            .attr("certificadoResponsable", &firma.certificado_responsable)
            .attr("noCertificadoResponsable", &firma.no_certificado_responsable)
            .close_empty();
    }
    out.push_str("\t</FirmaResponsables>\n");

    let institucion = &artifact.institucion;
    Element::open(&mut out, 1, "Institucion")
        .attr("cveInstitucion", &institucion.cve_institucion)
        .attr("nombreInstitucion", &institucion.nombre_institucion)
        .close_empty();

    let carrera = &artifact.carrera;
    Element::open(&mut out, 1, "Carrera")
        .attr("cveCarrera", &carrera.cve_carrera)
        .attr("nombreCarrera", &carrera.nombre_carrera)
        .opt_date("fechaInicio", carrera.fecha_inicio)
        .date("fechaTerminacion", carrera.fecha_terminacion)
        .attr(
            "idAutorizacionReconocimiento",
            &carrera.id_autorizacion_reconocimiento,
        )
        .attr(
            "autorizacionReconocimiento",
            &carrera.autorizacion_reconocimiento,
        )
        .opt_attr("numeroRvoe", carrera.numero_rvoe.as_deref())
        .close_empty();

    let profesionista = &artifact.profesionista;
    Element::open(&mut out, 1, "Profesionista")
        .attr("curp", &profesionista.curp)
        .attr("nombre", &profesionista.nombre)
        .attr("primerApellido", &profesionista.primer_apellido)
        .opt_attr("segundoApellido", profesionista.segundo_apellido.as_deref())
        .attr("correoElectronico", &profesionista.correo_electronico)
        .close_empty();

    let expedicion = &artifact.expedicion;
    Element::open(&mut out, 1, "Expedicion")
        .date("fechaExpedicion", expedicion.fecha_expedicion)
        .attr("idModalidadTitulacion", &expedicion.id_modalidad_titulacion)
        .attr("modalidadTitulacion", &expedicion.modalidad_titulacion)
        .opt_date("fechaExamenProfesional", expedicion.fecha_examen_profesional)
        .opt_date(
            "fechaExencionExamenProfesional",
            expedicion.fecha_exencion_examen_profesional,
        )
        .attr(
            "cumplioServicioSocial",
            if expedicion.cumplio_servicio_social { "1" } else { "0" },
        )
        .opt_attr(
            "idFundamentoLegalServicioSocial",
            expedicion.id_fundamento_legal_servicio_social.as_deref(),
        )
        .opt_attr(
            "fundamentoLegalServicioSocial",
            expedicion.fundamento_legal_servicio_social.as_deref(),
        )
        .attr("idEntidadFederativa", &institucion.id_entidad_federativa)
        .attr("entidadFederativa", &institucion.entidad_federativa)
        .close_empty();

    let antecedente = &artifact.antecedente;
    Element::open(&mut out, 1, "Antecedente")
        .attr("institucionProcedencia", &antecedente.institucion_procedencia)
        .attr(
            "idTipoEstudioAntecedente",
            &antecedente.id_tipo_estudio_antecedente,
        )
        .attr("tipoEstudioAntecedente", &antecedente.tipo_estudio_antecedente)
        .attr("idEntidadFederativa", &antecedente.id_entidad_federativa)
        .attr("entidadFederativa", &antecedente.entidad_federativa)
        .opt_date("fechaInicio", antecedente.fecha_inicio)
        .date("fechaTerminacion", antecedente.fecha_terminacion)
        .opt_attr("noCedula", antecedente.no_cedula.as_deref())
        .close_empty();

    out.push_str("</TituloElectronico>");
    out
}
