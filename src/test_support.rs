//! Shared fixtures for unit tests: cached RSA keys, self-signed
//! certificates and a sample title.

use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::NaiveDate;
use pkcs8::pkcs5::pbes2;
use pkcs8::{EncodePrivateKey, LineEnding, PrivateKeyInfo, SecretDocument};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs1v15::{Signature, SigningKey};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::der::asn1::UtcTime;
use x509_cert::der::{Decode, Encode, EncodePem};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate;

use crate::config::{InstitutionConfig, SigningCredentials};
use crate::types::title::{
    Antecedente, Carrera, Expedicion, Profesionista, Responsable, TitleRecord,
};

pub(crate) const KEY_PASSWORD: &str = "12345678a";

pub(crate) struct Fixture {
    pub key: RsaPrivateKey,
    pub cert_der: Vec<u8>,
}

impl Fixture {
    fn generate(subject: &str, serial: &[u8]) -> Self {
        let key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let validity = Validity::from_now(Duration::from_secs(365 * 24 * 3600)).unwrap();
        let cert_der = self_signed(&key, subject, serial, validity);
        Self { key, cert_der }
    }

    pub fn pkcs8_der(&self) -> Vec<u8> {
        self.key.to_pkcs8_der().unwrap().as_bytes().to_vec()
    }

    pub fn pkcs8_pem(&self) -> Vec<u8> {
        self.key
            .to_pkcs8_pem(LineEnding::LF)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    pub fn pkcs1_pem(&self) -> Vec<u8> {
        self.key
            .to_pkcs1_pem(LineEnding::LF)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    pub fn encrypted_pkcs8_der(&self, password: &str) -> Vec<u8> {
        encrypt(&self.key, password).as_bytes().to_vec()
    }

    pub fn encrypted_pkcs8_pem(&self, password: &str) -> Vec<u8> {
        encrypt(&self.key, password)
            .to_pem("ENCRYPTED PRIVATE KEY", LineEnding::LF)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    /// Encrypted the way SAT `.key` files are: PBKDF2-HMAC-SHA1 with
    /// DES-EDE3-CBC.
    pub fn sat_key_der(&self, password: &str) -> Vec<u8> {
        encrypt_sat(&self.key, password).as_bytes().to_vec()
    }

    pub fn sat_key_pem(&self, password: &str) -> Vec<u8> {
        encrypt_sat(&self.key, password)
            .to_pem("ENCRYPTED PRIVATE KEY", LineEnding::LF)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    pub fn cert_pem(&self) -> Vec<u8> {
        Certificate::from_der(&self.cert_der)
            .unwrap()
            .to_pem(LineEnding::LF)
            .unwrap()
            .into_bytes()
    }

    /// SAT-style credentials: DER certificate and DER encrypted PKCS#8 key.
    pub fn credentials(&self) -> SigningCredentials {
        SigningCredentials::new(
            self.cert_der.clone(),
            self.encrypted_pkcs8_der(KEY_PASSWORD),
            KEY_PASSWORD,
        )
    }
}

fn encrypt(key: &RsaPrivateKey, password: &str) -> SecretDocument {
    let der = key.to_pkcs8_der().unwrap();
    let info = PrivateKeyInfo::try_from(der.as_bytes()).unwrap();
    let salt = [0x5au8; 16];
    let iv = [0x3cu8; 16];
    let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(1_000, &salt, &iv).unwrap();
    info.encrypt_with_params(params, password).unwrap()
}

fn encrypt_sat(key: &RsaPrivateKey, password: &str) -> SecretDocument {
    let der = key.to_pkcs8_der().unwrap();
    let info = PrivateKeyInfo::try_from(der.as_bytes()).unwrap();
    let salt = [0xa5u8; 8];
    let iv = [0x17u8; 8];
    let params = pbes2::Parameters {
        kdf: pbes2::Kdf::Pbkdf2(pbes2::Pbkdf2Params {
            salt: &salt,
            iteration_count: 2_048,
            key_length: None,
            prf: pbes2::Pbkdf2Prf::HmacWithSha1,
        }),
        encryption: pbes2::EncryptionScheme::DesEde3Cbc { iv: &iv },
    };
    info.encrypt_with_params(params, password).unwrap()
}

pub(crate) fn self_signed(
    key: &RsaPrivateKey,
    subject: &str,
    serial: &[u8],
    validity: Validity,
) -> Vec<u8> {
    let signer = SigningKey::<Sha256>::new(key.clone());
    let spki = SubjectPublicKeyInfoOwned::from_key(key.to_public_key()).unwrap();
    let builder = CertificateBuilder::new(
        Profile::Root,
        SerialNumber::new(serial).unwrap(),
        validity,
        Name::from_str(subject).unwrap(),
        spki,
        &signer,
    )
    .unwrap();
    builder.build::<Signature>().unwrap().to_der().unwrap()
}

/// Validity window covering calendar year 2000.
pub(crate) fn expired_validity() -> Validity {
    let utc = |secs: u64| Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).unwrap());
    Validity {
        not_before: utc(946_684_800),
        not_after: utc(978_307_199),
    }
}

static PRIMARY: OnceLock<Fixture> = OnceLock::new();
static UNRELATED: OnceLock<Fixture> = OnceLock::new();

/// Institutional key and certificate, serial 255.
pub(crate) fn primary() -> &'static Fixture {
    PRIMARY.get_or_init(|| Fixture::generate("CN=Instituto de Estudios,O=IDEE,C=MX", &[0x00, 0xFF]))
}

/// A second, unrelated key pair.
pub(crate) fn unrelated() -> &'static Fixture {
    UNRELATED.get_or_init(|| Fixture::generate("CN=Otra Institucion,C=MX", &[0x01, 0x02, 0x03]))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn sample_institution() -> InstitutionConfig {
    InstitutionConfig {
        cve_institucion: "090123".to_string(),
        nombre_institucion: "Instituto de Estudios Educativos".to_string(),
        id_entidad_federativa: "09".to_string(),
        entidad_federativa: "CIUDAD DE MEXICO".to_string(),
    }
}

pub(crate) fn responsable(curp: &str, orden_firma: u32) -> Responsable {
    Responsable {
        nombre: "Laura".to_string(),
        primer_apellido: "Mendoza".to_string(),
        segundo_apellido: Some("Soto".to_string()),
        curp: curp.to_string(),
        id_cargo: "1".to_string(),
        cargo: "RECTOR".to_string(),
        abr_titulo: Some("DRA.".to_string()),
        orden_firma,
    }
}

/// Two signers declared out of signing order.
pub(crate) fn sample_title() -> TitleRecord {
    let mut secretario = responsable("PEGJ750505HDFRRN02", 2);
    secretario.nombre = "Juan".to_string();
    secretario.cargo = "SECRETARIO ACADEMICO".to_string();
    secretario.id_cargo = "3".to_string();
    secretario.segundo_apellido = None;
    secretario.abr_titulo = None;

    TitleRecord {
        folio_control: "IDEE-2024-0001".to_string(),
        responsables: vec![secretario, responsable("MESL700101MDFNTR01", 1)],
        carrera: Carrera {
            cve_carrera: "101".to_string(),
            nombre_carrera: "LICENCIATURA EN PEDAGOGIA".to_string(),
            fecha_inicio: Some(date(2019, 8, 19)),
            fecha_terminacion: date(2024, 6, 28),
            id_autorizacion_reconocimiento: "1".to_string(),
            autorizacion_reconocimiento: "RVOE FEDERAL".to_string(),
            numero_rvoe: Some("20190123".to_string()),
        },
        profesionista: Profesionista {
            curp: "LOAM000101MDFPRR05".to_string(),
            nombre: "María".to_string(),
            primer_apellido: "López".to_string(),
            segundo_apellido: Some("Arias".to_string()),
            correo_electronico: "maria.lopez@idee.edu.mx".to_string(),
        },
        expedicion: Expedicion {
            fecha_expedicion: date(2024, 9, 2),
            id_modalidad_titulacion: "1".to_string(),
            modalidad_titulacion: "POR TESIS".to_string(),
            fecha_examen_profesional: Some(date(2024, 8, 15)),
            fecha_exencion_examen_profesional: None,
            cumplio_servicio_social: true,
            id_fundamento_legal_servicio_social: Some("2".to_string()),
            fundamento_legal_servicio_social: Some("ART. 55 LRART. 5 CONST".to_string()),
        },
        antecedente: Antecedente {
            institucion_procedencia: "PREPARATORIA OFICIAL 12".to_string(),
            id_tipo_estudio_antecedente: "4".to_string(),
            tipo_estudio_antecedente: "BACHILLERATO".to_string(),
            id_entidad_federativa: "15".to_string(),
            entidad_federativa: "MEXICO".to_string(),
            fecha_inicio: None,
            fecha_terminacion: date(2019, 6, 30),
            no_cedula: None,
        },
    }
}
