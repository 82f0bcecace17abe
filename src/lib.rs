//! # sello-digital
//!
//! Digital seals for electronic professional titles (títulos electrónicos).
//!
//! A title record is rendered into a deterministic canonical string
//! ("cadena original"), signed by each responsible official with
//! SHA256withRSA (RSASSA-PKCS#1 v1.5), and the resulting seals are embedded
//! together with certificate metadata into a `TituloElectronico` document.
//!
//! ## Features
//!
//! - **Canonical strings**: `||`-wrapped, `|`-separated, typed fields with fixed layout
//! - **Key loading**: encrypted and plain PKCS#8 (PEM and DER) and PKCS#1 PEM, including SAT `.key` files
//! - **Certificates**: DER or PEM X.509, 20-digit serial numbers, validity windows
//! - **Seals**: sign and verify base64 SHA256withRSA signatures
//! - **Pair validation**: prove a certificate and key belong together before signing
//! - **Issuance**: shared institutional key or per-signer keys, XML and JSON output
//!
//! ## Quick Start
//!
//! ```rust
//! use sello_digital::canonical::CanonicalRecord;
//!
//! let mut builder = CanonicalRecord::builder();
//! builder.push_text("1.0")?.push_text("ABC123")?;
//! let record = builder.build();
//!
//! assert_eq!(record.to_canonical_string().as_str(), "||1.0|ABC123||");
//! # Ok::<(), sello_digital::error::CanonicalError>(())
//! ```
//!
//! Issuing a title with an institutional key:
//!
//! ```rust,ignore
//! use sello_digital::config::{IssuerConfig, SigningCredentials};
//! use sello_digital::issuance::{InstitutionalKey, Issuer};
//!
//! let credentials = SigningCredentials::new(cert_der, key_der, password);
//! let issuer = Issuer::new(IssuerConfig::default(), institution, InstitutionalKey::new(credentials));
//! let artifact = issuer.issue(&title)?;
//! println!("{}", artifact.to_xml());
//! ```
//!
//! ## Security
//!
//! - Private keys are never logged or serialized and are zeroized on drop
//! - A wrong password and an unreadable key file are reported identically
//! - Values containing `|` are rejected before a canonical string is rendered
//!
//! ## Error Handling
//!
//! Each component returns its own error type; [`error::Error`] aggregates
//! them and maps to a structured [`error::ErrorCode`].

pub mod assembler;
pub mod canonical;
pub mod certificate;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod issuance;
pub mod keys;
pub mod pairing;
pub mod provider;
pub mod title;
pub mod types;
pub mod verification;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_support;

pub use provider::init;
