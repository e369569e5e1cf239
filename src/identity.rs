//! Identity Record
//!
//! The durable principal + key + certificate tuple the client operates
//! on: company name, organizational unit, CUIT (tax identifier), the
//! PEM-encoded RSA key pair and the operator-installed certificate.
//!
//! Records are values. State transitions return a new record instead of
//! mutating in place, so the storage collaborator always sees either
//! the old record or the complete new one, never a partial update.

use crate::error::{Result, WsaaError};
use serde::{Deserialize, Serialize};

/// Principal identity as held in durable storage.
///
/// `public_key` and `private_key` are set together or not at all. The
/// certificate is only meaningful for the key pair it was issued for;
/// [`IdentityRecord::with_keys`] therefore always clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: String,
    pub unit: String,
    pub cuit: String,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub certificate: Option<String>,
}

/// Borrowed view of a record whose six fields are all present.
///
/// Obtained through [`IdentityRecord::require_complete`]; login needs
/// every field and this view makes that guarantee explicit.
#[derive(Debug, Clone, Copy)]
pub struct CompleteIdentity<'a> {
    pub name: &'a str,
    pub unit: &'a str,
    pub cuit: &'a str,
    pub public_key: &'a str,
    pub private_key: &'a str,
    pub certificate: &'a str,
}

impl IdentityRecord {
    /// Create a record with no key material or certificate.
    pub fn new(name: String, unit: String, cuit: String) -> Self {
        Self {
            name,
            unit,
            cuit,
            public_key: None,
            private_key: None,
            certificate: None,
        }
    }

    /// Return a copy carrying a fresh key pair.
    ///
    /// Any installed certificate belongs to the old keys and is
    /// cleared, not carried over.
    pub fn with_keys(self, public_key_pem: String, private_key_pem: String) -> Self {
        Self {
            public_key: Some(public_key_pem),
            private_key: Some(private_key_pem),
            certificate: None,
            ..self
        }
    }

    /// Return a copy with the operator-supplied certificate installed.
    ///
    /// No check is made that the certificate matches the stored public
    /// key; that is the operator's responsibility when completing the
    /// out-of-band CSR exchange.
    pub fn with_certificate(self, certificate_pem: String) -> Self {
        Self {
            certificate: Some(certificate_pem),
            ..self
        }
    }

    /// Canonical subject DN used both as the CSR subject and as the
    /// `source` field of login tickets. The field composition matches
    /// what the WSAA authority expects.
    pub fn source(&self) -> String {
        format!(
            "cn={},serialNumber={},o={},c=AR",
            self.name, self.cuit, self.unit
        )
    }

    /// True when both keys are present.
    pub fn has_keys(&self) -> bool {
        self.public_key.is_some() && self.private_key.is_some()
    }

    /// Borrow the stored key pair, failing with the first missing key
    /// field. Used by the CSR builder, which needs keys but not a
    /// certificate.
    pub fn require_keys(&self) -> Result<(&str, &str)> {
        let public_key = require_present(self.public_key.as_deref(), "public_key")?;
        let private_key = require_present(self.private_key.as_deref(), "private_key")?;
        Ok((public_key, private_key))
    }

    /// Validate that all six fields are present, returning a borrowed
    /// view. Fails with [`WsaaError::IncompleteIdentity`] naming the
    /// first missing field, checked in declaration order.
    pub fn require_complete(&self) -> Result<CompleteIdentity<'_>> {
        let name = require_nonempty(&self.name, "name")?;
        let unit = require_nonempty(&self.unit, "unit")?;
        let cuit = require_nonempty(&self.cuit, "cuit")?;
        let public_key = require_present(self.public_key.as_deref(), "public_key")?;
        let private_key = require_present(self.private_key.as_deref(), "private_key")?;
        let certificate = require_present(self.certificate.as_deref(), "certificate")?;
        Ok(CompleteIdentity {
            name,
            unit,
            cuit,
            public_key,
            private_key,
            certificate,
        })
    }
}

fn require_nonempty<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(WsaaError::IncompleteIdentity { field })
    } else {
        Ok(value)
    }
}

fn require_present<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WsaaError::IncompleteIdentity { field }),
    }
}
