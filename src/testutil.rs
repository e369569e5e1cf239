//! Test support.
//!
//! In production the identity certificate comes from AFIP: the
//! operator submits the CSR and installs the certificate the authority
//! returns. Tests stand in for that exchange by self-signing a
//! certificate over the generated key pair.

use crate::error::{Result, WsaaError};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::{X509, X509Name};

const X509_VERSION_3: i32 = 2; // X509 version 3 is represented by 2

/// Build a self-signed X.509v3 certificate over `key`, playing the
/// role of the authority-issued certificate in tests.
pub fn self_signed_certificate(key: &PKey<Private>, common_name: &str) -> Result<X509> {
    let mut name_builder = X509Name::builder().map_err(WsaaError::SigningFailed)?;
    name_builder
        .append_entry_by_nid(Nid::COMMONNAME, common_name)
        .map_err(WsaaError::SigningFailed)?;
    let name = name_builder.build();

    let mut builder = X509::builder().map_err(WsaaError::SigningFailed)?;
    builder
        .set_version(X509_VERSION_3)
        .map_err(WsaaError::SigningFailed)?;

    let mut serial = BigNum::new().map_err(WsaaError::SigningFailed)?;
    serial
        .rand(128, MsbOption::MAYBE_ZERO, false)
        .map_err(WsaaError::SigningFailed)?;
    let asn1_serial = serial.to_asn1_integer().map_err(WsaaError::SigningFailed)?;
    builder
        .set_serial_number(&asn1_serial)
        .map_err(WsaaError::SigningFailed)?;

    builder
        .set_subject_name(&name)
        .map_err(WsaaError::SigningFailed)?;
    builder
        .set_issuer_name(&name)
        .map_err(WsaaError::SigningFailed)?;

    let not_before = Asn1Time::days_from_now(0).map_err(WsaaError::SigningFailed)?;
    builder
        .set_not_before(&not_before)
        .map_err(WsaaError::SigningFailed)?;
    let not_after = Asn1Time::days_from_now(365).map_err(WsaaError::SigningFailed)?;
    builder
        .set_not_after(&not_after)
        .map_err(WsaaError::SigningFailed)?;

    builder.set_pubkey(key).map_err(WsaaError::SigningFailed)?;
    builder
        .sign(key, MessageDigest::sha256())
        .map_err(WsaaError::SigningFailed)?;

    Ok(builder.build())
}

/// PEM text of a self-signed certificate over `key`.
pub fn self_signed_certificate_pem(key: &PKey<Private>, common_name: &str) -> Result<String> {
    let cert = self_signed_certificate(key, common_name)?;
    let pem = cert.to_pem().map_err(WsaaError::SigningFailed)?;
    String::from_utf8(pem).map_err(|e| WsaaError::MalformedKeyMaterial(e.to_string()))
}
