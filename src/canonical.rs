//! Canonical string ("cadena original") construction.
//!
//! A record is an ordered list of typed fields. Rendering wraps the fields in
//! `||`, joins them with `|` and performs no escaping, so values containing
//! `|` are rejected while the record is built.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::SignerId;
use crate::error::CanonicalError;

pub const FIELD_DELIMITER: char = '|';
pub const OUTER_DELIMITER: &str = "||";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One typed value in a canonical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalField {
    Text(String),
    Date(NaiveDate),
    Flag(bool),
    /// Absent optional value; renders as an empty string.
    Empty,
}

impl CanonicalField {
    pub fn text(value: impl Into<String>) -> Self {
        CanonicalField::Text(value.into())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map_or(CanonicalField::Empty, CanonicalField::text)
    }

    pub fn date(value: NaiveDate) -> Self {
        CanonicalField::Date(value)
    }

    pub fn optional_date(value: Option<NaiveDate>) -> Self {
        value.map_or(CanonicalField::Empty, CanonicalField::Date)
    }

    pub fn flag(value: bool) -> Self {
        CanonicalField::Flag(value)
    }

    fn has_delimiter(&self) -> bool {
        matches!(self, CanonicalField::Text(s) if s.contains(FIELD_DELIMITER))
    }

    fn write_to(&self, out: &mut String) {
        match self {
            CanonicalField::Text(s) => out.push_str(s),
            CanonicalField::Date(d) => out.push_str(&d.format(DATE_FORMAT).to_string()),
            CanonicalField::Flag(true) => out.push('1'),
            CanonicalField::Flag(false) => out.push('0'),
            CanonicalField::Empty => {}
        }
    }
}

/// Rendered canonical string. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalString(Arc<str>);

impl CanonicalString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in Unicode scalar values.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl From<String> for CanonicalString {
    fn from(value: String) -> Self {
        CanonicalString(Arc::from(value))
    }
}

impl From<&str> for CanonicalString {
    fn from(value: &str) -> Self {
        CanonicalString(Arc::from(value))
    }
}

impl AsRef<str> for CanonicalString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CanonicalString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CanonicalString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(CanonicalString::from)
    }
}

/// Ordered fields plus the signers whose blocks were inlined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalRecord {
    fields: Vec<CanonicalField>,
    signers: Vec<SignerId>,
}

impl CanonicalRecord {
    pub fn builder() -> CanonicalRecordBuilder {
        CanonicalRecordBuilder::default()
    }

    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    /// Signer identities in the order their blocks appear.
    pub fn signers(&self) -> &[SignerId] {
        &self.signers
    }

    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Render the record. Byte-deterministic for equal records.
    pub fn to_canonical_string(&self) -> CanonicalString {
        let mut out = String::with_capacity(self.fields.len() * 16 + 4);
        out.push_str(OUTER_DELIMITER);
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(FIELD_DELIMITER);
            }
            field.write_to(&mut out);
        }
        out.push_str(OUTER_DELIMITER);
        CanonicalString::from(out)
    }
}

/// Builder validating every value as it is pushed.
#[derive(Debug, Default)]
pub struct CanonicalRecordBuilder {
    fields: Vec<CanonicalField>,
    signers: Vec<SignerId>,
}

impl CanonicalRecordBuilder {
    pub fn push(&mut self, field: CanonicalField) -> Result<&mut Self, CanonicalError> {
        if field.has_delimiter() {
            return Err(CanonicalError::DelimiterInValue {
                index: self.fields.len(),
            });
        }
        self.fields.push(field);
        Ok(self)
    }

    pub fn push_text(&mut self, value: impl Into<String>) -> Result<&mut Self, CanonicalError> {
        self.push(CanonicalField::text(value))
    }

    pub fn push_optional_text(&mut self, value: Option<&str>) -> Result<&mut Self, CanonicalError> {
        self.push(CanonicalField::optional_text(value))
    }

    pub fn push_date(&mut self, value: NaiveDate) -> Result<&mut Self, CanonicalError> {
        self.push(CanonicalField::date(value))
    }

    pub fn push_optional_date(
        &mut self,
        value: Option<NaiveDate>,
    ) -> Result<&mut Self, CanonicalError> {
        self.push(CanonicalField::optional_date(value))
    }

    pub fn push_flag(&mut self, value: bool) -> Result<&mut Self, CanonicalError> {
        self.push(CanonicalField::flag(value))
    }

    /// Inline a signer block. Either the whole block is added or nothing is.
    pub fn push_signer(
        &mut self,
        signer: SignerId,
        fields: impl IntoIterator<Item = CanonicalField>,
    ) -> Result<&mut Self, CanonicalError> {
        let block: Vec<CanonicalField> = fields.into_iter().collect();
        if let Some(offset) = block.iter().position(CanonicalField::has_delimiter) {
            return Err(CanonicalError::DelimiterInValue {
                index: self.fields.len() + offset,
            });
        }
        self.fields.extend(block);
        self.signers.push(signer);
        Ok(self)
    }

    pub fn build(self) -> CanonicalRecord {
        CanonicalRecord {
            fields: self.fields,
            signers: self.signers,
        }
    }
}
