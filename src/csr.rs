//! CSR Builder
//!
//! Produces the PKCS#10 certificate signing request the operator
//! submits to AFIP to obtain the identity certificate. The subject DN
//! composition (`cn`, `serialNumber`, `o`, `c`) must match what the
//! authority expects; the request is signed SHA-256 with RSA.

use crate::error::{Result, WsaaError};
use crate::identity::IdentityRecord;
use crate::keys;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::x509::{X509Name, X509Req};

/// Build a PEM-encoded PKCS#10 request for the record's key pair.
///
/// Requires both keys present (`IncompleteIdentity` otherwise); the
/// certificate field is not needed at this stage.
pub fn build_certificate_request(record: &IdentityRecord) -> Result<String> {
    let (public_pem, private_pem) = record.require_keys()?;
    let private_key = keys::private_key_from_pem(private_pem)?;
    let public_key = keys::public_key_from_pem(public_pem)?;

    let subject = subject_name(record)?;

    let mut builder = X509Req::builder().map_err(WsaaError::SigningFailed)?;
    builder
        .set_subject_name(&subject)
        .map_err(WsaaError::SigningFailed)?;
    builder
        .set_pubkey(&public_key)
        .map_err(WsaaError::SigningFailed)?;
    builder
        .sign(&private_key, MessageDigest::sha256())
        .map_err(WsaaError::SigningFailed)?;

    let request = builder.build();
    let pem = request.to_pem().map_err(WsaaError::SigningFailed)?;
    String::from_utf8(pem).map_err(|e| WsaaError::MalformedKeyMaterial(e.to_string()))
}

/// Subject name with entries in canonical order: CN, serialNumber, O, C.
fn subject_name(record: &IdentityRecord) -> Result<X509Name> {
    let mut builder = X509Name::builder().map_err(WsaaError::SigningFailed)?;
    builder
        .append_entry_by_nid(Nid::COMMONNAME, &record.name)
        .map_err(WsaaError::SigningFailed)?;
    builder
        .append_entry_by_nid(Nid::SERIALNUMBER, &record.cuit)
        .map_err(WsaaError::SigningFailed)?;
    builder
        .append_entry_by_nid(Nid::ORGANIZATIONNAME, &record.unit)
        .map_err(WsaaError::SigningFailed)?;
    builder
        .append_entry_by_nid(Nid::COUNTRYNAME, "AR")
        .map_err(WsaaError::SigningFailed)?;
    Ok(builder.build())
}
