//! Lookup data types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied postal code.
///
/// Opaque: the lookup path never parses or normalizes it. Format checks live
/// at the HTTP edge (see [`PostalCode::is_well_formed`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `12345678` or `12345-678`.
    pub fn is_well_formed(&self) -> bool {
        let bytes = self.0.as_bytes();
        let digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
        match bytes.len() {
            8 => digits(bytes),
            9 => bytes[5] == b'-' && digits(&bytes[..5]) && digits(&bytes[6..]),
            _ => false,
        }
    }
}

impl From<&str> for PostalCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for PostalCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured address returned for a postal code.
///
/// Field names on the wire follow the upstream (ViaCEP) body, both when
/// decoding it and when serving the inbound response. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(rename = "cep")]
    pub code: Option<String>,

    #[serde(rename = "logradouro")]
    pub street: Option<String>,

    #[serde(rename = "complemento")]
    pub complement: Option<String>,

    #[serde(rename = "bairro")]
    pub neighborhood: Option<String>,

    #[serde(rename = "localidade")]
    pub city: Option<String>,

    #[serde(rename = "uf")]
    pub region: Option<String>,

    /// Municipal (IBGE) code.
    #[serde(rename = "ibge")]
    pub municipal_code: Option<String>,

    /// State tax-routing (GIA) code.
    #[serde(rename = "gia")]
    pub tax_routing_code: Option<String>,

    /// Telephone area code.
    #[serde(rename = "ddd")]
    pub area_code: Option<String>,

    /// Federal accounting (SIAFI) code.
    #[serde(rename = "siafi")]
    pub accounting_code: Option<String>,
}
